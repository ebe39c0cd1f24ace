//! # Expense Repository
//!
//! Operating expenses. Refills add rows here under the
//! `"Fuel Purchase"` category inside their own transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, StationResult};
use forecourt_core::{CategoryTotal, CoreError, Expense, NewExpense};

// =============================================================================
// Executor-level Queries
// =============================================================================

pub(crate) async fn insert<'e, E>(executor: E, expense: &Expense) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %expense.id, category = %expense.category, amount = expense.amount_cents, "Inserting expense");

    sqlx::query(
        r#"
        INSERT INTO expenses (
            id, category, description, amount_cents, payment_method,
            receipt_number, vendor, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&expense.id)
    .bind(&expense.category)
    .bind(&expense.description)
    .bind(expense.amount_cents)
    .bind(expense.payment_method)
    .bind(&expense.receipt_number)
    .bind(&expense.vendor)
    .bind(expense.created_at)
    .bind(expense.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Expenses in `[from, to)`, oldest first.
pub(crate) async fn between<'e, E>(
    executor: E,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DbResult<Vec<Expense>>
where
    E: SqliteExecutor<'e>,
{
    let expenses = sqlx::query_as::<_, Expense>(
        r#"
        SELECT id, category, description, amount_cents, payment_method,
               receipt_number, vendor, created_at, updated_at
        FROM expenses
        WHERE created_at >= ?1 AND created_at < ?2
        ORDER BY created_at
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await?;

    Ok(expenses)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists expenses newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount_cents, payment_method,
                   receipt_number, vendor, created_at, updated_at
            FROM expenses
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount_cents, payment_method,
                   receipt_number, vendor, created_at, updated_at
            FROM expenses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Lists expenses in one category, newest first.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount_cents, payment_method,
                   receipt_number, vendor, created_at, updated_at
            FROM expenses
            WHERE category = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Expense>> {
        between(&self.pool, from, to).await
    }

    /// Total spend per category, largest first.
    pub async fn totals_by_category(&self) -> DbResult<Vec<CategoryTotal>> {
        let totals = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category,
                   COALESCE(SUM(amount_cents), 0) AS total_cents,
                   COUNT(*) AS count
            FROM expenses
            GROUP BY category
            ORDER BY total_cents DESC, category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Records an expense.
    pub async fn insert(&self, input: &NewExpense) -> StationResult<Expense> {
        input.validate()?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: input.category.trim().to_string(),
            description: input.description.trim().to_string(),
            amount_cents: input.amount_cents,
            payment_method: input.payment_method,
            receipt_number: input.receipt_number.clone(),
            vendor: input.vendor.clone(),
            created_at: now,
            updated_at: now,
        };

        insert(&self.pool, &expense).await?;
        Ok(expense)
    }

    pub async fn update(&self, id: &str, input: &NewExpense) -> StationResult<Expense> {
        input.validate()?;

        debug!(id = %id, "Updating expense");

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                category = ?2,
                description = ?3,
                amount_cents = ?4,
                payment_method = ?5,
                receipt_number = ?6,
                vendor = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.category.trim())
        .bind(input.description.trim())
        .bind(input.amount_cents)
        .bind(input.payment_method)
        .bind(&input.receipt_number)
        .bind(&input.vendor)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Expense", id).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Expense", id).into())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }
}
