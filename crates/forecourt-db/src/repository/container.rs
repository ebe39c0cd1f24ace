//! # Container Repository
//!
//! Database operations for fuel containers (tanks).
//!
//! ## Level Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reconciliation:  current_level = current_level - dispensed   (delta)   │
//! │  Refill:          current_level = current_level + accepted    (delta)   │
//! │                                                                         │
//! │  Pump A and Pump B share Tank 1 and both reconcile at once:             │
//! │    7500 - 50 - 30 = 7420   ✓  (neither write overwrites the other)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The level is never written as an absolute value after creation.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbResult, StationResult};
use crate::repository::pump;
use crate::service::integrity::IntegrityService;
use forecourt_core::{Container, CoreError, Money, NewContainer, ValidationError, Volume};

// =============================================================================
// Executor-level Queries
// =============================================================================

pub(crate) async fn fetch<'e, E>(executor: E, id: &str) -> DbResult<Option<Container>>
where
    E: SqliteExecutor<'e>,
{
    let container = sqlx::query_as::<_, Container>(
        r#"
        SELECT id, name, fuel_type, capacity_ml, current_level_ml,
               avg_cost_cents_per_liter, version, created_at, updated_at
        FROM containers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(container)
}

/// Subtracts a dispensed volume from the level. No floor.
pub(crate) async fn deplete<'e, E>(
    executor: E,
    id: &str,
    volume: Volume,
    now: DateTime<Utc>,
) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, volume = %volume, "Depleting container");

    let result = sqlx::query(
        r#"
        UPDATE containers SET
            current_level_ml = current_level_ml - ?2,
            version = version + 1,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(volume.milliliters())
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Adds an accepted delivery and stores the new average cost.
///
/// Guarded by `expected_version` because the average was computed from the
/// level the caller read.
pub(crate) async fn apply_refill<'e, E>(
    executor: E,
    id: &str,
    expected_version: i64,
    accepted: Volume,
    new_avg_cost: Money,
    now: DateTime<Utc>,
) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, accepted = %accepted, "Applying refill");

    let result = sqlx::query(
        r#"
        UPDATE containers SET
            current_level_ml = current_level_ml + ?3,
            avg_cost_cents_per_liter = ?4,
            version = version + 1,
            updated_at = ?5
        WHERE id = ?1 AND version = ?2
        "#,
    )
    .bind(id)
    .bind(expected_version)
    .bind(accepted.milliliters())
    .bind(new_avg_cost.cents())
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Fuel types that have at least one container.
pub(crate) async fn distinct_fuel_types<'e, E>(executor: E) -> DbResult<Vec<String>>
where
    E: SqliteExecutor<'e>,
{
    let types = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT fuel_type FROM containers ORDER BY fuel_type",
    )
    .fetch_all(executor)
    .await?;

    Ok(types)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for container database operations.
#[derive(Debug, Clone)]
pub struct ContainerRepository {
    pool: SqlitePool,
}

impl ContainerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ContainerRepository { pool }
    }

    /// Lists all containers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Container>> {
        let containers = sqlx::query_as::<_, Container>(
            r#"
            SELECT id, name, fuel_type, capacity_ml, current_level_ml,
                   avg_cost_cents_per_liter, version, created_at, updated_at
            FROM containers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(containers)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Container>> {
        fetch(&self.pool, id).await
    }

    /// Inserts a new container with its opening level.
    pub async fn insert(&self, input: &NewContainer) -> StationResult<Container> {
        input.validate()?;

        let now = Utc::now();
        let container = Container {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            fuel_type: input.fuel_type.trim().to_string(),
            capacity_ml: input.capacity_ml,
            current_level_ml: input.current_level_ml,
            avg_cost_cents_per_liter: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %container.id, name = %container.name, "Inserting container");

        sqlx::query(
            r#"
            INSERT INTO containers (
                id, name, fuel_type, capacity_ml, current_level_ml,
                avg_cost_cents_per_liter, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&container.id)
        .bind(&container.name)
        .bind(&container.fuel_type)
        .bind(container.capacity_ml)
        .bind(container.current_level_ml)
        .bind(container.avg_cost_cents_per_liter)
        .bind(container.version)
        .bind(container.created_at)
        .bind(container.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(container)
    }

    /// Updates name, fuel type and capacity. The level is not editable.
    ///
    /// ## Errors
    /// * `FuelTypeMismatch` - attached pumps dispense a different fuel
    /// * `Validation` - capacity below the current level
    /// * `Conflict` - `expected_version` is stale
    pub async fn update(
        &self,
        id: &str,
        expected_version: i64,
        input: &NewContainer,
    ) -> StationResult<Container> {
        input.validate()?;

        let current = fetch(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Container", id))?;

        let fuel_type = input.fuel_type.trim();
        for pump_fuel in pump::fuel_types_on_container(&self.pool, id).await? {
            if pump_fuel != fuel_type {
                return Err(CoreError::FuelTypeMismatch {
                    pump_fuel,
                    container_fuel: fuel_type.to_string(),
                }
                .into());
            }
        }

        if input.capacity_ml < current.current_level_ml {
            return Err(ValidationError::OutOfRange {
                field: "capacity".to_string(),
                min: current.current_level_ml,
                max: i64::MAX,
            }
            .into());
        }

        debug!(id = %id, version = expected_version, "Updating container");

        let result = sqlx::query(
            r#"
            UPDATE containers SET
                name = ?3,
                fuel_type = ?4,
                capacity_ml = ?5,
                version = version + 1,
                updated_at = ?6
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(input.name.trim())
        .bind(fuel_type)
        .bind(input.capacity_ml)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::conflict("Container", id).into());
        }

        fetch(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Container", id).into())
    }

    /// Deletes a container that no pump draws from.
    pub async fn delete(&self, id: &str) -> StationResult<()> {
        IntegrityService::new(self.pool.clone())
            .delete_container(id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use forecourt_core::{NewContainer, NewPump};

    fn tank(name: &str, fuel: &str, capacity_l: i64, level_l: i64) -> NewContainer {
        NewContainer {
            name: name.to_string(),
            fuel_type: fuel.to_string(),
            capacity_ml: capacity_l * 1000,
            current_level_ml: level_l * 1000,
        }
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.containers().insert(&tank("Tank 2", "Premium", 8_000, 6_200)).await.unwrap();
        db.containers().insert(&tank("Tank 1", "Regular", 10_000, 7_500)).await.unwrap();

        let names: Vec<_> = db
            .containers()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Tank 1", "Tank 2"]);
    }

    #[tokio::test]
    async fn test_update_refuses_fuel_change_under_attached_pumps() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let c = db.containers().insert(&tank("Tank 1", "Regular", 10_000, 7_500)).await.unwrap();
        db.pumps()
            .insert(&NewPump {
                name: "Pump A".to_string(),
                container_id: Some(c.id.clone()),
                fuel_type: "Regular".to_string(),
                total_counter_ml: 0,
                is_active: true,
            })
            .await
            .unwrap();

        let err = db
            .containers()
            .update(&c.id, c.version, &tank("Tank 1", "Diesel", 10_000, 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
    }

    #[tokio::test]
    async fn test_update_capacity_and_version() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let c = db.containers().insert(&tank("Tank 1", "Regular", 10_000, 7_500)).await.unwrap();

        let too_small = db
            .containers()
            .update(&c.id, c.version, &tank("Tank 1", "Regular", 5_000, 0))
            .await
            .unwrap_err();
        assert_eq!(too_small.kind(), ErrorKind::Validation);

        let bigger = db
            .containers()
            .update(&c.id, c.version, &tank("Big Tank", "Regular", 12_000, 0))
            .await
            .unwrap();
        assert_eq!(bigger.capacity_ml, 12_000_000);
        // level unaffected by edits
        assert_eq!(bigger.current_level_ml, 7_500_000);

        let stale = db
            .containers()
            .update(&c.id, c.version, &tank("Tank X", "Regular", 12_000, 0))
            .await
            .unwrap_err();
        assert_eq!(stale.kind(), ErrorKind::Conflict);
    }
}
