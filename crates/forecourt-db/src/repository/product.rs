//! # Product Repository
//!
//! Database operations for shop products.
//!
//! ## Key Operations
//! - Lookup by barcode (till scanner)
//! - Substring search on name and barcode
//! - Low-stock listing for the inventory page
//! - Signed stock adjustments that never drive stock below zero
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ Absolute update (loses a concurrent sale)                       │
//! │     UPDATE products SET current_stock = 7 WHERE id = ?              │
//! │                                                                     │
//! │  ✅ Conditional delta update                                        │
//! │     UPDATE products SET current_stock = current_stock + ?delta      │
//! │     WHERE id = ? AND current_stock + ?delta >= 0                    │
//! │                                                                     │
//! │  0 rows → product missing or not enough stock                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbResult, StationResult};
use crate::service::integrity::IntegrityService;
use forecourt_core::validation::validate_search_query;
use forecourt_core::{CoreError, NewProduct, Product};

// =============================================================================
// Executor-level Queries
// =============================================================================

pub(crate) async fn fetch<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, barcode, name, category, cost_price_cents, sale_price_cents,
               current_stock, min_stock_level, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Applies a signed stock delta if the result stays at or above zero.
///
/// ## Returns
/// Rows affected: 0 when the product is missing or stock is insufficient.
pub(crate) async fn apply_stock_delta<'e, E>(
    executor: E,
    id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = %id, delta, "Adjusting stock");

    let result = sqlx::query(
        r#"
        UPDATE products SET
            current_stock = current_stock + ?2,
            updated_at = ?3
        WHERE id = ?1 AND current_stock + ?2 >= 0
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Turns a zero-row stock update into the right error.
pub(crate) fn stock_failure(id: &str, current: Option<Product>, requested: i64) -> CoreError {
    match current {
        Some(product) => CoreError::InsufficientStock {
            product: product.name,
            available: product.current_stock,
            requested,
        },
        None => CoreError::not_found("Product", id),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.products().get_by_barcode("5000112637922").await?;
/// let hits = db.products().search("oil", 20).await?;
/// db.products().adjust_stock(&id, -3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, category, cost_price_cents, sale_price_cents,
                   current_stock, min_stock_level, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        fetch(&self.pool, id).await
    }

    /// Gets a product by its barcode (exact match).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, category, cost_price_cents, sale_price_cents,
                   current_stock, min_stock_level, created_at, updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches products by name or barcode substring, case-insensitive.
    ///
    /// An empty query returns the first `limit` products by name.
    pub async fn search(&self, query: &str, limit: u32) -> StationResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit, "Searching products");

        let pattern = format!("%{}%", escape_like(&query));
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, category, cost_price_cents, sale_price_cents,
                   current_stock, min_stock_level, created_at, updated_at
            FROM products
            WHERE name LIKE ?1 ESCAPE '\' OR barcode LIKE ?1 ESCAPE '\'
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists products in one category.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, category, cost_price_cents, sale_price_cents,
                   current_stock, min_stock_level, created_at, updated_at
            FROM products
            WHERE category = ?1
            ORDER BY name
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products at or below their minimum stock level.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, barcode, name, category, cost_price_cents, sale_price_cents,
                   current_stock, min_stock_level, created_at, updated_at
            FROM products
            WHERE current_stock <= min_stock_level
            ORDER BY current_stock, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `Validation` - bad field
    /// * `UniqueViolation` - barcode already exists
    pub async fn insert(&self, input: &NewProduct) -> StationResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode: input.barcode.trim().to_string(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            cost_price_cents: input.cost_price_cents,
            sale_price_cents: input.sale_price_cents,
            current_stock: input.current_stock,
            min_stock_level: input.min_stock_level,
            created_at: now,
            updated_at: now,
        };

        debug!(barcode = %product.barcode, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, barcode, name, category, cost_price_cents, sale_price_cents,
                current_stock, min_stock_level, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.current_stock)
        .bind(product.min_stock_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Replaces a product's editable fields.
    pub async fn update(&self, id: &str, input: &NewProduct) -> StationResult<Product> {
        input.validate()?;

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                barcode = ?2,
                name = ?3,
                category = ?4,
                cost_price_cents = ?5,
                sale_price_cents = ?6,
                current_stock = ?7,
                min_stock_level = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.barcode.trim())
        .bind(input.name.trim())
        .bind(input.category.trim())
        .bind(input.cost_price_cents)
        .bind(input.sale_price_cents)
        .bind(input.current_stock)
        .bind(input.min_stock_level)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", id).into());
        }

        self.require(id).await
    }

    /// Adds (positive) or removes (negative) stock.
    ///
    /// ## Errors
    /// * `InsufficientStock` - the result would go below zero
    /// * `NotFound` - no such product
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StationResult<Product> {
        let rows = apply_stock_delta(&self.pool, id, delta, Utc::now()).await?;

        if rows == 0 {
            let current = fetch(&self.pool, id).await?;
            return Err(stock_failure(id, current, -delta).into());
        }

        self.require(id).await
    }

    /// Deletes a product that has never been sold.
    pub async fn delete(&self, id: &str) -> StationResult<()> {
        IntegrityService::new(self.pool.clone())
            .delete_product(id)
            .await
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn require(&self, id: &str) -> StationResult<Product> {
        fetch(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", id).into())
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;
    use crate::error::{DbError, ErrorKind, StationError};
    use crate::pool::{Database, DbConfig};
    use forecourt_core::{CoreError, NewProduct, StockStatus};

    fn new_product(barcode: &str, name: &str, category: &str, stock: i64, min: i64) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            cost_price_cents: 100,
            sale_price_cents: 250,
            current_stock: stock,
            min_stock_level: min,
        }
    }

    #[tokio::test]
    async fn test_barcode_lookup_and_uniqueness() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .insert(&new_product("111", "Water 500ml", "Beverages", 40, 10))
            .await
            .unwrap();

        let found = db.products().get_by_barcode("111").await.unwrap().unwrap();
        assert_eq!(found.id, p.id);

        let dup = db
            .products()
            .insert(&new_product("111", "Other", "Beverages", 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(dup, StationError::Db(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_search_category_and_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&new_product("111", "Water 500ml", "Beverages", 40, 10)).await.unwrap();
        repo.insert(&new_product("222", "Motor Oil 1L", "Automotive", 3, 5)).await.unwrap();
        repo.insert(&new_product("333", "Oil Filter", "Automotive", 12, 10)).await.unwrap();

        let hits = repo.search("oil", 20).await.unwrap();
        assert_eq!(hits.len(), 2);

        let by_barcode = repo.search("22", 20).await.unwrap();
        assert_eq!(by_barcode.len(), 1);

        assert_eq!(repo.list_by_category("Automotive").await.unwrap().len(), 2);

        let low = repo.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Motor Oil 1L");
        assert_eq!(low[0].stock_status(), StockStatus::Low);
    }

    #[tokio::test]
    async fn test_adjust_stock_never_goes_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .insert(&new_product("111", "Water 500ml", "Beverages", 5, 2))
            .await
            .unwrap();

        let restocked = db.products().adjust_stock(&p.id, 10).await.unwrap();
        assert_eq!(restocked.current_stock, 15);

        let err = db.products().adjust_stock(&p.id, -16).await.unwrap_err();
        assert!(matches!(
            err,
            StationError::Core(CoreError::InsufficientStock {
                available: 15,
                requested: 16,
                ..
            })
        ));

        let unchanged = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(unchanged.current_stock, 15);

        let missing = db.products().adjust_stock("nope", 1).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
