//! # Fuel Price Repository
//!
//! One posted selling price per fuel type, edited on the settings page.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbResult, StationResult};
use forecourt_core::validation::{validate_fuel_type, validate_price_cents};
use forecourt_core::{FuelPrice, Money};

pub(crate) async fn fetch<'e, E>(executor: E, fuel_type: &str) -> DbResult<Option<FuelPrice>>
where
    E: SqliteExecutor<'e>,
{
    let price = sqlx::query_as::<_, FuelPrice>(
        "SELECT fuel_type, price_cents_per_liter, updated_at FROM fuel_prices WHERE fuel_type = ?1",
    )
    .bind(fuel_type)
    .fetch_optional(executor)
    .await?;

    Ok(price)
}

/// Repository for fuel price database operations.
#[derive(Debug, Clone)]
pub struct FuelPriceRepository {
    pool: SqlitePool,
}

impl FuelPriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FuelPriceRepository { pool }
    }

    /// Lists posted prices ordered by fuel type.
    pub async fn list(&self) -> DbResult<Vec<FuelPrice>> {
        let prices = sqlx::query_as::<_, FuelPrice>(
            "SELECT fuel_type, price_cents_per_liter, updated_at FROM fuel_prices ORDER BY fuel_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(prices)
    }

    pub async fn get(&self, fuel_type: &str) -> DbResult<Option<FuelPrice>> {
        fetch(&self.pool, fuel_type).await
    }

    /// Posts a price, replacing any existing one for the fuel type.
    pub async fn upsert(&self, fuel_type: &str, price_per_liter: Money) -> StationResult<FuelPrice> {
        validate_fuel_type(fuel_type)?;
        validate_price_cents("price_per_liter", price_per_liter.cents())?;

        let price = FuelPrice {
            fuel_type: fuel_type.trim().to_string(),
            price_cents_per_liter: price_per_liter.cents(),
            updated_at: Utc::now(),
        };

        debug!(fuel_type = %price.fuel_type, price = %price_per_liter, "Upserting fuel price");

        sqlx::query(
            r#"
            INSERT INTO fuel_prices (fuel_type, price_cents_per_liter, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(fuel_type) DO UPDATE SET
                price_cents_per_liter = excluded.price_cents_per_liter,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&price.fuel_type)
        .bind(price.price_cents_per_liter)
        .bind(price.updated_at)
        .execute(&self.pool)
        .await?;

        info!(fuel_type = %price.fuel_type, price = %price_per_liter, "Fuel price posted");
        Ok(price)
    }
}
