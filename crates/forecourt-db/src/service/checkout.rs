//! # Checkout Service
//!
//! Commits a POS cart: one product sale per line, stock decremented per
//! line, all or nothing.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::error::{DbError, StationResult};
use crate::repository::{product, sale};
use forecourt_core::cart::Cart;
use forecourt_core::{CoreError, PaymentMethod, Sale};

/// Service for POS checkout.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Records every cart line as a sale at the price quoted in the cart.
    ///
    /// ## Errors
    /// - `EmptyCart` if the cart has no lines
    /// - `InsufficientStock` if any line exceeds the product's stock
    /// - `NotFound` if a product was deleted after it was added
    ///
    /// On any error no sale is recorded and no stock moves.
    #[instrument(skip(self, cart), fields(lines = cart.item_count()))]
    pub async fn checkout(
        &self,
        cart: &Cart,
        payment_method: PaymentMethod,
    ) -> StationResult<Vec<Sale>> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;
        let mut sales = Vec::with_capacity(cart.item_count());

        for line in cart.lines() {
            let rows =
                product::apply_stock_delta(&mut *tx, &line.product_id, -line.quantity, now).await?;
            if rows == 0 {
                let current = product::fetch(&mut *tx, &line.product_id).await?;
                return Err(product::stock_failure(&line.product_id, current, line.quantity).into());
            }

            let sale = Sale::product(
                &line.product_id,
                line.quantity,
                line.unit_price(),
                payment_method,
            );
            sale::insert(&mut *tx, &sale).await?;
            sales.push(sale);
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            sales = sales.len(),
            total = %cart.total(),
            "Checkout complete"
        );

        Ok(sales)
    }
}
