//! # Counter Service
//!
//! Turns a pump counter reading into a fuel sale.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reading: Pump A, previous 4250 L, new 4300 L, $1.45/L                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_dispense → 50 L, $72.50   (ValidationError here: no writes)   │
//! │       │                                                                 │
//! │  BEGIN │                                                                │
//! │       ▼                                                                 │
//! │  UPDATE pumps ... WHERE id = A AND total_counter_ml = 4250000          │
//! │       │                                                                 │
//! │       ├── 0 rows → StaleCounter / NotFound → ROLLBACK                  │
//! │       ▼                                                                 │
//! │  UPDATE containers SET current_level_ml = current_level_ml - 50000     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO sales (fuel, pump A, 50000 ml, 145, 7250, ...)            │
//! │       │                                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two readings taken from the same previous counter race on the
//! conditional update: one commits, the other sees zero rows and gets
//! `StaleCounter`. Container depletion is a delta, so pumps sharing a
//! tank compose.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::error::{DbError, StationResult};
use crate::repository::{container, fuel_price, pump, sale};
use forecourt_core::reconciliation::{compute_dispense, CounterReading, CounterReconciliation};
use forecourt_core::validation::validate_uuid;
use forecourt_core::{CoreError, Money};

/// Service for pump counter operations.
#[derive(Debug, Clone)]
pub struct CounterService {
    pool: SqlitePool,
}

impl CounterService {
    pub fn new(pool: SqlitePool) -> Self {
        CounterService { pool }
    }

    /// Records a counter reading at an explicit price.
    ///
    /// ## Errors
    /// - `Validation` if the counter does not advance or the price is negative
    /// - `StaleCounter` if the pump's counter no longer reads `previous_counter`
    /// - `NotFound` if the pump does not exist
    ///
    /// Nothing is written on any error.
    #[instrument(skip(self, reading), fields(pump_id = %reading.pump_id))]
    pub async fn reconcile(
        &self,
        reading: &CounterReading,
        price_per_liter: Money,
    ) -> StationResult<CounterReconciliation> {
        validate_uuid(&reading.pump_id)?;
        let dispense = compute_dispense(
            reading.previous_counter,
            reading.new_counter,
            price_per_liter,
        )?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let rows = pump::advance_counter(
            &mut *tx,
            &reading.pump_id,
            dispense.previous_counter,
            dispense.new_counter,
            dispense.volume_dispensed,
            now,
        )
        .await?;

        if rows == 0 {
            return Err(match pump::fetch(&mut *tx, &reading.pump_id).await? {
                Some(current) => CoreError::StaleCounter {
                    pump_id: reading.pump_id.clone(),
                    expected: reading.previous_counter,
                    actual: current.total_counter(),
                },
                None => CoreError::not_found("Pump", &reading.pump_id),
            }
            .into());
        }

        let pump = pump::fetch(&mut *tx, &reading.pump_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Pump", &reading.pump_id))?;

        let container = match pump.container_id.as_deref() {
            Some(container_id) => {
                container::deplete(&mut *tx, container_id, dispense.volume_dispensed, now).await?;
                container::fetch(&mut *tx, container_id).await?
            }
            None => None,
        };

        let sale = dispense.to_sale(&pump.id, reading.payment_method);
        sale::insert(&mut *tx, &sale).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        if let Some((c, shortfall)) = container
            .as_ref()
            .and_then(|c| c.shortfall().map(|s| (c, s)))
        {
            warn!(container_id = %c.id, shortfall = %shortfall, "Container level below zero after dispense");
        }

        info!(
            volume = %dispense.volume_dispensed,
            revenue = %dispense.revenue,
            sale_id = %sale.id,
            "Counter reconciled"
        );

        Ok(CounterReconciliation {
            volume_dispensed: dispense.volume_dispensed,
            revenue: dispense.revenue,
            sale,
            pump,
            container,
        })
    }

    /// Records a counter reading at the posted price for the pump's fuel.
    ///
    /// Fails with `FuelPriceMissing` when no price is posted.
    #[instrument(skip(self, reading), fields(pump_id = %reading.pump_id))]
    pub async fn reconcile_at_posted_price(
        &self,
        reading: &CounterReading,
    ) -> StationResult<CounterReconciliation> {
        let pump = pump::fetch(&self.pool, &reading.pump_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Pump", &reading.pump_id))?;

        let price = fuel_price::fetch(&self.pool, &pump.fuel_type)
            .await?
            .ok_or_else(|| CoreError::FuelPriceMissing {
                fuel_type: pump.fuel_type.clone(),
            })?;

        self.reconcile(reading, price.price_per_liter()).await
    }

    /// Zeroes every pump's daily counter. Totals are untouched.
    #[instrument(skip(self))]
    pub async fn reset_daily_counters(&self) -> StationResult<u64> {
        let reset = pump::reset_daily(&self.pool, Utc::now()).await?;
        info!(pumps = reset, "Daily counters reset");
        Ok(reset)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, StationError};
    use crate::pool::{Database, DbConfig};
    use forecourt_core::reconciliation::CounterReading;
    use forecourt_core::{
        CoreError, Money, NewContainer, NewPump, PaymentMethod, Pump, SaleType, ValidationError,
        Volume,
    };

    async fn tank(db: &Database, level_l: i64) -> String {
        db.containers()
            .insert(&NewContainer {
                name: "Tank 1".to_string(),
                fuel_type: "Regular".to_string(),
                capacity_ml: Volume::from_liters(10_000).milliliters(),
                current_level_ml: Volume::from_liters(level_l).milliliters(),
            })
            .await
            .unwrap()
            .id
    }

    async fn pump(db: &Database, name: &str, container_id: Option<String>, counter_l: i64) -> Pump {
        db.pumps()
            .insert(&NewPump {
                name: name.to_string(),
                container_id,
                fuel_type: "Regular".to_string(),
                total_counter_ml: Volume::from_liters(counter_l).milliliters(),
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn reading(pump: &Pump, new_l: i64) -> CounterReading {
        CounterReading::new(&pump.id, pump.total_counter(), Volume::from_liters(new_l))
    }

    #[tokio::test]
    async fn test_reconcile_records_sale_and_depletes_tank() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank_id = tank(&db, 7_500).await;
        let pump_a = pump(&db, "Pump A", Some(tank_id.clone()), 4_250).await;

        let result = db
            .counters()
            .reconcile(&reading(&pump_a, 4_300), Money::from_cents(145))
            .await
            .unwrap();

        assert_eq!(result.volume_dispensed, Volume::from_liters(50));
        assert_eq!(result.revenue, Money::from_cents(7250));
        assert_eq!(result.sale.sale_type, SaleType::Fuel);
        assert_eq!(result.sale.payment_method, PaymentMethod::FuelCounter);
        assert_eq!(result.pump.total_counter(), Volume::from_liters(4_300));
        assert_eq!(result.pump.daily_counter(), Volume::from_liters(50));
        assert_eq!(result.pump.version, pump_a.version + 1);

        let container = result.container.unwrap();
        assert_eq!(container.current_level(), Volume::from_liters(7_450));
        assert_eq!(container.id, tank_id);

        let stored = db.sales().get_by_id(&result.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 7250);
        assert_eq!(stored.quantity, 50_000);
    }

    #[tokio::test]
    async fn test_deleting_fuel_sale_keeps_counters_and_tank() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank_id = tank(&db, 7_500).await;
        let pump_a = pump(&db, "Pump A", Some(tank_id.clone()), 4_250).await;

        let result = db
            .counters()
            .reconcile(&reading(&pump_a, 4_300), Money::from_cents(145))
            .await
            .unwrap();
        db.sales().delete(&result.sale.id).await.unwrap();

        let after = db.pumps().get_by_id(&pump_a.id).await.unwrap().unwrap();
        assert_eq!(after.total_counter(), Volume::from_liters(4_300));
        assert_eq!(after.daily_counter(), Volume::from_liters(50));
        assert_eq!(after.version, result.pump.version);

        let tank = db.containers().get_by_id(&tank_id).await.unwrap().unwrap();
        assert_eq!(tank.current_level(), Volume::from_liters(7_450));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counter_going_backwards_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank_id = tank(&db, 7_500).await;
        let pump_a = pump(&db, "Pump A", Some(tank_id.clone()), 4_250).await;

        let err = db
            .counters()
            .reconcile(&reading(&pump_a, 4_200), Money::from_cents(145))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StationError::Core(CoreError::Validation(
                ValidationError::CounterNotIncreasing { .. }
            ))
        ));

        let unchanged = db.pumps().get_by_id(&pump_a.id).await.unwrap().unwrap();
        assert_eq!(unchanged.total_counter(), Volume::from_liters(4_250));
        let tank = db.containers().get_by_id(&tank_id).await.unwrap().unwrap();
        assert_eq!(tank.current_level(), Volume::from_liters(7_500));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_readings_commit_exactly_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank_id = tank(&db, 7_500).await;
        let pump_a = pump(&db, "Pump A", Some(tank_id.clone()), 4_250).await;

        let counters = db.counters();
        let first = reading(&pump_a, 4_300);
        let second = reading(&pump_a, 4_310);
        let price = Money::from_cents(145);

        let (a, b) = tokio::join!(
            counters.reconcile(&first, price),
            counters.reconcile(&second, price)
        );

        let (ok, err) = match (a, b) {
            (Ok(ok), Err(err)) | (Err(err), Ok(ok)) => (ok, err),
            other => panic!("expected one success and one failure, got {other:?}"),
        };

        assert_eq!(err.kind(), ErrorKind::Conflict);
        match err {
            StationError::Core(CoreError::StaleCounter { expected, actual, .. }) => {
                assert_eq!(expected, Volume::from_liters(4_250));
                assert_eq!(actual, ok.pump.total_counter());
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(db.sales().count().await.unwrap(), 1);
        let tank = db.containers().get_by_id(&tank_id).await.unwrap().unwrap();
        assert_eq!(tank.current_level(), Volume::from_liters(7_500) - ok.volume_dispensed);
    }

    #[tokio::test]
    async fn test_pumps_sharing_a_tank_both_deplete_it() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank_id = tank(&db, 1_000).await;
        let a = pump(&db, "Pump A", Some(tank_id.clone()), 100).await;
        let b = pump(&db, "Pump B", Some(tank_id.clone()), 200).await;

        let price = Money::from_cents(145);
        db.counters().reconcile(&reading(&a, 130), price).await.unwrap();
        db.counters().reconcile(&reading(&b, 220), price).await.unwrap();

        let tank = db.containers().get_by_id(&tank_id).await.unwrap().unwrap();
        assert_eq!(tank.current_level(), Volume::from_liters(950));
    }

    #[tokio::test]
    async fn test_dispense_past_empty_leaves_negative_level() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tank_id = tank(&db, 10).await;
        let a = pump(&db, "Pump A", Some(tank_id), 0).await;

        let result = db
            .counters()
            .reconcile(&reading(&a, 25), Money::from_cents(145))
            .await
            .unwrap();

        let container = result.container.unwrap();
        assert_eq!(container.shortfall(), Some(Volume::from_liters(15)));
    }

    #[tokio::test]
    async fn test_pump_without_container() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = pump(&db, "Pump A", None, 0).await;

        let result = db
            .counters()
            .reconcile(&reading(&a, 10), Money::from_cents(100))
            .await
            .unwrap();

        assert!(result.container.is_none());
        assert_eq!(result.revenue, Money::from_cents(1000));
    }

    #[tokio::test]
    async fn test_unknown_pump_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let missing = CounterReading::new(
            uuid::Uuid::new_v4().to_string(),
            Volume::from_liters(1),
            Volume::from_liters(2),
        );

        let err = db
            .counters()
            .reconcile(&missing, Money::from_cents(145))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_posted_price_is_required() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = pump(&db, "Pump A", None, 0).await;

        let err = db
            .counters()
            .reconcile_at_posted_price(&reading(&a, 10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StationError::Core(CoreError::FuelPriceMissing { .. })
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);

        db.fuel_prices()
            .upsert("Regular", Money::from_cents(145))
            .await
            .unwrap();
        let result = db
            .counters()
            .reconcile_at_posted_price(&reading(&a, 10))
            .await
            .unwrap();
        assert_eq!(result.revenue, Money::from_cents(1450));
    }

    #[tokio::test]
    async fn test_daily_reset_keeps_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = pump(&db, "Pump A", None, 100).await;
        pump(&db, "Pump B", None, 200).await;

        db.counters()
            .reconcile(&reading(&a, 150), Money::from_cents(145))
            .await
            .unwrap();

        let reset = db.counters().reset_daily_counters().await.unwrap();
        assert_eq!(reset, 2);

        let after = db.pumps().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(after.daily_counter(), Volume::zero());
        assert_eq!(after.total_counter(), Volume::from_liters(150));
    }
}
