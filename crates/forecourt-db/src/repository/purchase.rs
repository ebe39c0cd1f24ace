//! # Fuel Purchase Repository
//!
//! Read access to the delivery history written by `RefillService`.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use forecourt_core::FuelPurchase;

pub(crate) async fn insert<'e, E>(executor: E, purchase: &FuelPurchase) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %purchase.id, container_id = %purchase.container_id, volume_ml = purchase.volume_ml, "Inserting fuel purchase");

    sqlx::query(
        r#"
        INSERT INTO fuel_purchases (
            id, container_id, volume_ml, requested_volume_ml,
            cost_cents_per_liter, total_cents, supplier, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&purchase.id)
    .bind(&purchase.container_id)
    .bind(purchase.volume_ml)
    .bind(purchase.requested_volume_ml)
    .bind(purchase.cost_cents_per_liter)
    .bind(purchase.total_cents)
    .bind(&purchase.supplier)
    .bind(purchase.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Repository for fuel purchase records.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Lists all deliveries newest first.
    pub async fn list(&self) -> DbResult<Vec<FuelPurchase>> {
        let purchases = sqlx::query_as::<_, FuelPurchase>(
            r#"
            SELECT id, container_id, volume_ml, requested_volume_ml,
                   cost_cents_per_liter, total_cents, supplier, created_at
            FROM fuel_purchases
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Lists deliveries into one container, newest first.
    pub async fn list_by_container(&self, container_id: &str) -> DbResult<Vec<FuelPurchase>> {
        let purchases = sqlx::query_as::<_, FuelPurchase>(
            r#"
            SELECT id, container_id, volume_ml, requested_volume_ml,
                   cost_cents_per_liter, total_cents, supplier, created_at
            FROM fuel_purchases
            WHERE container_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(container_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<FuelPurchase>> {
        let purchase = sqlx::query_as::<_, FuelPurchase>(
            r#"
            SELECT id, container_id, volume_ml, requested_volume_ml,
                   cost_cents_per_liter, total_cents, supplier, created_at
            FROM fuel_purchases
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }
}
