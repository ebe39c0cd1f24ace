//! # Integrity Service
//!
//! Deletes that are refused while other records still point at the target.
//!
//! ```text
//! Pump      ◄── Sale.pump_id         (blocked while any sale exists)
//! Product   ◄── Sale.product_id      (blocked while any sale exists)
//! Container ◄── Pump.container_id    (blocked while any pump draws from it)
//! ```
//!
//! The count and the delete run in one transaction, so a sale recorded
//! between the check and the delete cannot slip through. The schema's
//! `ON DELETE RESTRICT` backs this up.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{info, instrument};

use crate::error::{DbError, DbResult, StationResult};
use forecourt_core::CoreError;

/// How many records reference a target, and the newest of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dependents {
    pub count: i64,
    pub latest: Option<DateTime<Utc>>,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// One guarded relationship.
struct Guard {
    entity: &'static str,
    table: &'static str,
    dependent: &'static str,
    count_sql: &'static str,
}

const PUMP: Guard = Guard {
    entity: "Pump",
    table: "pumps",
    dependent: "sale",
    count_sql: "SELECT COUNT(*), MAX(created_at) FROM sales WHERE pump_id = ?1",
};

const PRODUCT: Guard = Guard {
    entity: "Product",
    table: "products",
    dependent: "sale",
    count_sql: "SELECT COUNT(*), MAX(created_at) FROM sales WHERE product_id = ?1",
};

const CONTAINER: Guard = Guard {
    entity: "Container",
    table: "containers",
    dependent: "pump",
    count_sql: "SELECT COUNT(*), MAX(created_at) FROM pumps WHERE container_id = ?1",
};

async fn dependents<'e, E>(executor: E, guard: &Guard, id: &str) -> DbResult<Dependents>
where
    E: SqliteExecutor<'e>,
{
    let (count, latest) = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(guard.count_sql)
        .bind(id)
        .fetch_one(executor)
        .await?;

    Ok(Dependents { count, latest })
}

/// Service for deletes guarded by referential checks.
#[derive(Debug, Clone)]
pub struct IntegrityService {
    pool: SqlitePool,
}

impl IntegrityService {
    pub fn new(pool: SqlitePool) -> Self {
        IntegrityService { pool }
    }

    /// Sales recorded against a pump.
    pub async fn pump_dependents(&self, id: &str) -> DbResult<Dependents> {
        dependents(&self.pool, &PUMP, id).await
    }

    /// Sales recorded against a product.
    pub async fn product_dependents(&self, id: &str) -> DbResult<Dependents> {
        dependents(&self.pool, &PRODUCT, id).await
    }

    /// Pumps drawing from a container.
    pub async fn container_dependents(&self, id: &str) -> DbResult<Dependents> {
        dependents(&self.pool, &CONTAINER, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_pump(&self, id: &str) -> StationResult<()> {
        self.guarded_delete(&PUMP, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> StationResult<()> {
        self.guarded_delete(&PRODUCT, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_container(&self, id: &str) -> StationResult<()> {
        self.guarded_delete(&CONTAINER, id).await
    }

    async fn guarded_delete(&self, guard: &Guard, id: &str) -> StationResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let found = dependents(&mut *tx, guard, id).await?;
        if !found.is_empty() {
            return Err(CoreError::ReferentialIntegrity {
                entity: guard.entity.to_lowercase(),
                id: id.to_string(),
                dependent: guard.dependent.to_string(),
                count: found.count,
                latest: found.latest,
            }
            .into());
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1", guard.table);
        let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(guard.entity, id).into());
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(entity = guard.entity, id = %id, "Deleted");
        Ok(())
    }
}
