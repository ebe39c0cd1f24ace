//! # Pump Repository
//!
//! Database operations for pumps.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Column              Written by                                         │
//! │  ──────────────────  ─────────────────────────────────────────────────  │
//! │  name, fuel_type,    PumpRepository::insert / update                    │
//! │  container_id                                                           │
//! │  is_active           PumpRepository::set_active                         │
//! │  total_counter_ml    CounterService::reconcile (conditional update)     │
//! │  daily_counter_ml    CounterService::reconcile / reset_daily_counters   │
//! │  version             every write above                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Counters are never written through this repository's public API.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbResult, StationResult};
use crate::repository::container;
use crate::service::integrity::IntegrityService;
use forecourt_core::{CoreError, NewPump, Pump, Volume};

// =============================================================================
// Executor-level Queries
// =============================================================================
//
// Shared by the repository (on the pool) and by services (inside a
// transaction). Anything that runs inside a transaction must go through
// these with `&mut *tx`, never through the pool.

pub(crate) async fn fetch<'e, E>(executor: E, id: &str) -> DbResult<Option<Pump>>
where
    E: SqliteExecutor<'e>,
{
    let pump = sqlx::query_as::<_, Pump>(
        r#"
        SELECT id, name, container_id, fuel_type, total_counter_ml, daily_counter_ml,
               is_active, version, created_at, updated_at
        FROM pumps
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(pump)
}

/// Moves the counter forward only if it still reads `previous`.
///
/// ## Returns
/// Rows affected: 1 on success, 0 if the pump is missing or the counter
/// moved since the caller read it.
pub(crate) async fn advance_counter<'e, E>(
    executor: E,
    id: &str,
    previous: Volume,
    new: Volume,
    dispensed: Volume,
    now: DateTime<Utc>,
) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, previous = %previous, new = %new, "Advancing pump counter");

    let result = sqlx::query(
        r#"
        UPDATE pumps SET
            total_counter_ml = ?3,
            daily_counter_ml = daily_counter_ml + ?4,
            version = version + 1,
            updated_at = ?5
        WHERE id = ?1 AND total_counter_ml = ?2
        "#,
    )
    .bind(id)
    .bind(previous.milliliters())
    .bind(new.milliliters())
    .bind(dispensed.milliliters())
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Zeroes every pump's daily counter. Returns the number of pumps reset.
pub(crate) async fn reset_daily<'e, E>(executor: E, now: DateTime<Utc>) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE pumps SET
            daily_counter_ml = 0,
            version = version + 1,
            updated_at = ?1
        "#,
    )
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Distinct fuel types of pumps attached to a container.
pub(crate) async fn fuel_types_on_container<'e, E>(
    executor: E,
    container_id: &str,
) -> DbResult<Vec<String>>
where
    E: SqliteExecutor<'e>,
{
    let types = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT fuel_type FROM pumps WHERE container_id = ?1",
    )
    .bind(container_id)
    .fetch_all(executor)
    .await?;

    Ok(types)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for pump database operations.
///
/// ## Usage
/// ```rust,ignore
/// let pumps = db.pumps().list().await?;
/// let pump = db.pumps().get_by_id(&id).await?;
/// db.pumps().set_active(&id, false).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PumpRepository {
    pool: SqlitePool,
}

impl PumpRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PumpRepository { pool }
    }

    /// Lists all pumps ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Pump>> {
        let pumps = sqlx::query_as::<_, Pump>(
            r#"
            SELECT id, name, container_id, fuel_type, total_counter_ml, daily_counter_ml,
                   is_active, version, created_at, updated_at
            FROM pumps
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pumps)
    }

    /// Lists the pumps drawing from a container.
    pub async fn list_by_container(&self, container_id: &str) -> DbResult<Vec<Pump>> {
        let pumps = sqlx::query_as::<_, Pump>(
            r#"
            SELECT id, name, container_id, fuel_type, total_counter_ml, daily_counter_ml,
                   is_active, version, created_at, updated_at
            FROM pumps
            WHERE container_id = ?1
            ORDER BY name
            "#,
        )
        .bind(container_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pumps)
    }

    /// Gets a pump by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Pump))` - Pump found
    /// * `Ok(None)` - Pump not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Pump>> {
        fetch(&self.pool, id).await
    }

    /// Inserts a new pump.
    ///
    /// ## Errors
    /// * `Validation` - bad name, fuel type or counter
    /// * `NotFound` - `container_id` does not exist
    /// * `FuelTypeMismatch` - container holds a different fuel
    pub async fn insert(&self, input: &NewPump) -> StationResult<Pump> {
        input.validate()?;
        self.check_container(input).await?;

        let now = Utc::now();
        let pump = Pump {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            container_id: input.container_id.clone(),
            fuel_type: input.fuel_type.trim().to_string(),
            total_counter_ml: input.total_counter_ml,
            daily_counter_ml: 0,
            is_active: input.is_active,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %pump.id, name = %pump.name, "Inserting pump");

        sqlx::query(
            r#"
            INSERT INTO pumps (
                id, name, container_id, fuel_type, total_counter_ml, daily_counter_ml,
                is_active, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&pump.id)
        .bind(&pump.name)
        .bind(&pump.container_id)
        .bind(&pump.fuel_type)
        .bind(pump.total_counter_ml)
        .bind(pump.daily_counter_ml)
        .bind(pump.is_active)
        .bind(pump.version)
        .bind(pump.created_at)
        .bind(pump.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(pump)
    }

    /// Updates a pump's name, fuel type, container and active flag.
    ///
    /// Counters are left untouched. `expected_version` must match the stored
    /// version, otherwise the edit raced another write and is refused.
    pub async fn update(
        &self,
        id: &str,
        expected_version: i64,
        input: &NewPump,
    ) -> StationResult<Pump> {
        input.validate()?;
        self.check_container(input).await?;

        debug!(id = %id, version = expected_version, "Updating pump");

        let result = sqlx::query(
            r#"
            UPDATE pumps SET
                name = ?3,
                container_id = ?4,
                fuel_type = ?5,
                is_active = ?6,
                version = version + 1,
                updated_at = ?7
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(id)
        .bind(expected_version)
        .bind(input.name.trim())
        .bind(&input.container_id)
        .bind(input.fuel_type.trim())
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(match fetch(&self.pool, id).await? {
                Some(_) => CoreError::conflict("Pump", id).into(),
                None => CoreError::not_found("Pump", id).into(),
            });
        }

        self.require(id).await
    }

    /// Activates or deactivates a pump.
    pub async fn set_active(&self, id: &str, is_active: bool) -> StationResult<Pump> {
        debug!(id = %id, is_active, "Setting pump active flag");

        let result = sqlx::query(
            r#"
            UPDATE pumps SET
                is_active = ?2,
                version = version + 1,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Pump", id).into());
        }

        self.require(id).await
    }

    /// Deletes a pump that has no recorded sales.
    ///
    /// ## Errors
    /// * `ReferentialIntegrity` - sales reference this pump
    /// * `NotFound` - no such pump
    pub async fn delete(&self, id: &str) -> StationResult<()> {
        IntegrityService::new(self.pool.clone()).delete_pump(id).await
    }

    /// Counts pumps (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pumps")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn require(&self, id: &str) -> StationResult<Pump> {
        fetch(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Pump", id).into())
    }

    /// A pump must dispense the fuel its container holds.
    async fn check_container(&self, input: &NewPump) -> StationResult<()> {
        let Some(container_id) = &input.container_id else {
            return Ok(());
        };

        let container = container::fetch(&self.pool, container_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Container", container_id))?;

        if container.fuel_type != input.fuel_type.trim() {
            return Err(CoreError::FuelTypeMismatch {
                pump_fuel: input.fuel_type.trim().to_string(),
                container_fuel: container.fuel_type,
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use forecourt_core::{NewContainer, NewPump};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank = db
            .containers()
            .insert(&NewContainer {
                name: "Tank 1".to_string(),
                fuel_type: "Regular".to_string(),
                capacity_ml: 10_000_000,
                current_level_ml: 7_500_000,
            })
            .await
            .unwrap();
        (db, tank.id)
    }

    fn new_pump(name: &str, container_id: Option<String>, fuel: &str) -> NewPump {
        NewPump {
            name: name.to_string(),
            container_id,
            fuel_type: fuel.to_string(),
            total_counter_ml: 4_250_000,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, tank) = setup().await;
        let pump = db
            .pumps()
            .insert(&new_pump("Pump A", Some(tank.clone()), "Regular"))
            .await
            .unwrap();

        let fetched = db.pumps().get_by_id(&pump.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Pump A");
        assert_eq!(fetched.total_counter_ml, 4_250_000);
        assert_eq!(fetched.daily_counter_ml, 0);
        assert_eq!(fetched.container_id.as_deref(), Some(tank.as_str()));

        let on_tank = db.pumps().list_by_container(&tank).await.unwrap();
        assert_eq!(on_tank.len(), 1);
    }

    #[tokio::test]
    async fn test_fuel_type_must_match_container() {
        let (db, tank) = setup().await;
        let err = db
            .pumps()
            .insert(&new_pump("Pump B", Some(tank), "Diesel"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Business);
    }

    #[tokio::test]
    async fn test_unknown_container_is_not_found() {
        let (db, _) = setup().await;
        let err = db
            .pumps()
            .insert(&new_pump(
                "Pump C",
                Some("550e8400-e29b-41d4-a716-446655440000".to_string()),
                "Regular",
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_checks_version() {
        let (db, tank) = setup().await;
        let pump = db
            .pumps()
            .insert(&new_pump("Pump A", Some(tank.clone()), "Regular"))
            .await
            .unwrap();

        let renamed = db
            .pumps()
            .update(&pump.id, pump.version, &new_pump("Pump A1", Some(tank.clone()), "Regular"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Pump A1");
        assert_eq!(renamed.version, pump.version + 1);
        // Counter untouched by metadata edits
        assert_eq!(renamed.total_counter_ml, pump.total_counter_ml);

        let stale = db
            .pumps()
            .update(&pump.id, pump.version, &new_pump("Pump A2", Some(tank), "Regular"))
            .await
            .unwrap_err();
        assert_eq!(stale.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_set_active() {
        let (db, tank) = setup().await;
        let pump = db
            .pumps()
            .insert(&new_pump("Pump D", Some(tank), "Regular"))
            .await
            .unwrap();

        let off = db.pumps().set_active(&pump.id, false).await.unwrap();
        assert!(!off.is_active);

        let missing = db.pumps().set_active("nope", true).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
