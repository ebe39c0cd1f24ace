//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Sale Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CounterService::reconcile ──► Sale { fuel, pump_id, quantity = mL }    │
//! │                                                                         │
//! │  CheckoutService::checkout ──► Sale { product, product_id, qty = units }│
//! │                                                                         │
//! │  Sales are immutable. Deleting one does NOT put fuel back in the tank,  │
//! │  roll back the pump counter, or restock the product.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use forecourt_core::{RecentSale, Sale};

// =============================================================================
// Executor-level Queries
// =============================================================================

pub(crate) async fn insert<'e, E>(executor: E, sale: &Sale) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %sale.id, sale_type = ?sale.sale_type, total = sale.total_cents, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, sale_type, pump_id, product_id, quantity,
            unit_price_cents, total_cents, payment_method, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(sale.sale_type)
    .bind(&sale.pump_id)
    .bind(&sale.product_id)
    .bind(sale.quantity)
    .bind(sale.unit_price_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(sale.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Sales in `[from, to)`, oldest first.
pub(crate) async fn between<'e, E>(
    executor: E,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DbResult<Vec<Sale>>
where
    E: SqliteExecutor<'e>,
{
    let sales = sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, sale_type, pump_id, product_id, quantity,
               unit_price_cents, total_cents, payment_method, created_at
        FROM sales
        WHERE created_at >= ?1 AND created_at < ?2
        ORDER BY created_at
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    Ok(sales)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_type, pump_id, product_id, quantity,
                   unit_price_cents, total_cents, payment_method, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists sales newest first, optionally capped.
    pub async fn list(&self, limit: Option<u32>) -> DbResult<Vec<Sale>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map(i64::from).unwrap_or(-1);

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_type, pump_id, product_id, quantity,
                   unit_price_cents, total_cents, payment_method, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales created in `[from, to)`, oldest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        between(&self.pool, from, to).await
    }

    /// Lists sales for one pump, newest first.
    pub async fn list_by_pump(&self, pump_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_type, pump_id, product_id, quantity,
                   unit_price_cents, total_cents, payment_method, created_at
            FROM sales
            WHERE pump_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(pump_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Most recent sales with the pump or product name attached.
    pub async fn recent_with_names(&self, limit: u32) -> DbResult<Vec<RecentSale>> {
        let sales = sqlx::query_as::<_, RecentSale>(
            r#"
            SELECT s.id, s.sale_type, s.pump_id, s.product_id, s.quantity,
                   s.unit_price_cents, s.total_cents, s.payment_method, s.created_at,
                   p.name AS pump_name,
                   pr.name AS product_name
            FROM sales s
            LEFT JOIN pumps p ON p.id = s.pump_id
            LEFT JOIN products pr ON pr.id = s.product_id
            ORDER BY s.created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Inserts a sale built with `Sale::fuel` or `Sale::product`.
    ///
    /// Writes the row only. Use `CounterService` or `CheckoutService` to keep
    /// pump counters, tank levels and stock in step.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        insert(&self.pool, sale).await
    }

    /// Deletes a sale. Pump, container and product state are left as they are.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
