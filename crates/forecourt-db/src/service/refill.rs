//! # Refill Service
//!
//! Records a fuel delivery into a container.
//!
//! ## Effects (one transaction)
//! ```text
//! RefillRequest { Tank 1, 800 L, $1.30/L, "Acme Fuels" }
//!      │
//!      ▼
//! plan_refill: headroom 500 L → accept 500 L, reject 300 L
//!      │
//!      ├──► UPDATE containers  (+500 L, new weighted cost, version guard)
//!      ├──► INSERT fuel_purchases (500 L of 800 L requested)
//!      └──► INSERT expenses   ("Fuel Purchase", $650.00, vendor Acme Fuels)
//! ```
//!
//! The weighted average is computed from the level read inside the
//! transaction, so the container update is guarded by `version`. A
//! concurrent dispense bumps the version and the refill fails with
//! `Conflict` instead of averaging over a stale level.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult, StationResult};
use crate::repository::purchase::{self, PurchaseRepository};
use crate::repository::{container, expense};
use forecourt_core::refill::{plan_refill, RefillOutcome, RefillRequest};
use forecourt_core::{CoreError, Expense, FuelPurchase, FUEL_PURCHASE_CATEGORY};

/// Service for container deliveries.
#[derive(Debug, Clone)]
pub struct RefillService {
    pool: SqlitePool,
}

impl RefillService {
    pub fn new(pool: SqlitePool) -> Self {
        RefillService { pool }
    }

    /// Adds a delivery to a container, clamped to its capacity.
    ///
    /// ## Errors
    /// - `Validation` for a non-positive volume or negative cost
    /// - `NotFound` if the container does not exist
    /// - `ContainerFull` if there is no headroom at all
    /// - `Conflict` if the container changed during the refill
    #[instrument(skip(self, request), fields(container_id = %request.container_id))]
    pub async fn refill(&self, request: &RefillRequest) -> StationResult<RefillOutcome> {
        request.validate()?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let current = container::fetch(&mut *tx, &request.container_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Container", &request.container_id))?;

        let plan = plan_refill(&current, request.volume, request.cost_per_liter)?;

        let rows = container::apply_refill(
            &mut *tx,
            &current.id,
            current.version,
            plan.accepted,
            plan.new_avg_cost_per_liter,
            now,
        )
        .await?;

        if rows == 0 {
            return Err(CoreError::conflict("Container", &current.id).into());
        }

        let supplier = request
            .supplier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let purchase = FuelPurchase {
            id: Uuid::new_v4().to_string(),
            container_id: current.id.clone(),
            volume_ml: plan.accepted.milliliters(),
            requested_volume_ml: plan.requested.milliliters(),
            cost_cents_per_liter: request.cost_per_liter.cents(),
            total_cents: plan.total_cost.cents(),
            supplier: supplier.clone(),
            created_at: now,
        };
        purchase::insert(&mut *tx, &purchase).await?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            category: FUEL_PURCHASE_CATEGORY.to_string(),
            description: format!(
                "{} of {} into {}",
                plan.accepted, current.fuel_type, current.name
            ),
            amount_cents: plan.total_cost.cents(),
            payment_method: request.payment_method,
            receipt_number: None,
            vendor: supplier,
            created_at: now,
            updated_at: now,
        };
        expense::insert(&mut *tx, &expense).await?;

        let container = container::fetch(&mut *tx, &current.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Container", &current.id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        if plan.rejected.is_positive() {
            warn!(
                requested = %plan.requested,
                accepted = %plan.accepted,
                rejected = %plan.rejected,
                "Refill exceeded capacity; overflow not recorded"
            );
        }

        info!(
            accepted = %plan.accepted,
            level = %container.current_level(),
            cost = %plan.total_cost,
            "Container refilled"
        );

        Ok(RefillOutcome {
            plan,
            container,
            purchase,
            expense,
        })
    }

    /// Deliveries into a container, newest first.
    pub async fn history(&self, container_id: &str) -> DbResult<Vec<FuelPurchase>> {
        PurchaseRepository::new(self.pool.clone())
            .list_by_container(container_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, StationError};
    use crate::pool::{Database, DbConfig};
    use forecourt_core::refill::RefillRequest;
    use forecourt_core::{
        CoreError, Money, NewContainer, PaymentMethod, Volume, FUEL_PURCHASE_CATEGORY,
    };

    async fn tank(db: &Database, capacity_l: i64, level_l: i64) -> String {
        db.containers()
            .insert(&NewContainer {
                name: "Tank 1".to_string(),
                fuel_type: "Regular".to_string(),
                capacity_ml: Volume::from_liters(capacity_l).milliliters(),
                current_level_ml: Volume::from_liters(level_l).milliliters(),
            })
            .await
            .unwrap()
            .id
    }

    fn request(container_id: &str, liters: i64, cost_cents: i64) -> RefillRequest {
        RefillRequest {
            container_id: container_id.to_string(),
            volume: Volume::from_liters(liters),
            cost_per_liter: Money::from_cents(cost_cents),
            supplier: Some("Acme Fuels".to_string()),
            payment_method: PaymentMethod::BankTransfer,
        }
    }

    #[tokio::test]
    async fn test_refill_records_purchase_and_expense() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = tank(&db, 10_000, 7_500).await;

        let outcome = db.refills().refill(&request(&id, 2_000, 130)).await.unwrap();

        assert_eq!(outcome.container.current_level(), Volume::from_liters(9_500));
        assert_eq!(outcome.purchase.volume(), Volume::from_liters(2_000));
        assert_eq!(outcome.expense.category, FUEL_PURCHASE_CATEGORY);
        assert_eq!(outcome.expense.amount_cents, 260_000);
        assert_eq!(outcome.expense.vendor.as_deref(), Some("Acme Fuels"));
        assert_eq!(outcome.expense.payment_method, PaymentMethod::BankTransfer);

        assert_eq!(db.refills().history(&id).await.unwrap().len(), 1);
        let expenses = db.expenses().list_by_category(FUEL_PURCHASE_CATEGORY).await.unwrap();
        assert_eq!(expenses.len(), 1);
    }

    #[tokio::test]
    async fn test_refill_never_exceeds_capacity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = tank(&db, 10_000, 9_500).await;

        let outcome = db.refills().refill(&request(&id, 800, 130)).await.unwrap();

        assert_eq!(outcome.plan.accepted, Volume::from_liters(500));
        assert_eq!(outcome.plan.rejected, Volume::from_liters(300));
        assert_eq!(outcome.container.current_level(), outcome.container.capacity());
        assert_eq!(outcome.purchase.overflow(), Volume::from_liters(300));
        assert_eq!(outcome.expense.amount_cents, 65_000);
    }

    #[tokio::test]
    async fn test_full_container_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = tank(&db, 5_000, 5_000).await;

        let err = db.refills().refill(&request(&id, 100, 130)).await.unwrap_err();
        assert!(matches!(err, StationError::Core(CoreError::ContainerFull { .. })));
        assert_eq!(err.kind(), ErrorKind::Business);

        assert!(db.refills().history(&id).await.unwrap().is_empty());
        assert!(db.expenses().list().await.unwrap().is_empty());
        let tank = db.containers().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(tank.current_level(), Volume::from_liters(5_000));
    }

    #[tokio::test]
    async fn test_unknown_container() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .refills()
            .refill(&request("missing", 100, 130))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_refill_updates_weighted_cost() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = tank(&db, 10_000, 0).await;

        db.refills().refill(&request(&id, 1_000, 100)).await.unwrap();
        let outcome = db.refills().refill(&request(&id, 1_000, 200)).await.unwrap();

        assert_eq!(outcome.container.avg_cost_per_liter(), Money::from_cents(150));
        assert_eq!(outcome.container.version, 3);
    }
}
