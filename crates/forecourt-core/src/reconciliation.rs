//! # Counter Reconciliation
//!
//! Turns a pump counter reading into a dispensed volume and its revenue.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  previous_counter ──┐                                                   │
//! │                     ├──► compute_dispense ──► Dispense                  │
//! │  new_counter ───────┤         │                 ├── volume_dispensed    │
//! │  price per litre ───┘         │                 └── revenue             │
//! │                               │                                         │
//! │                               └── new ≤ previous → CounterNotIncreasing │
//! │                                                                         │
//! │  forecourt-db then applies the Dispense atomically:                     │
//! │    pump counters ─► container level ─► fuel sale                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Container, PaymentMethod, Pump, Sale};
use crate::validation::{
    validate_counter_advance, validate_non_negative, validate_price_cents, ValidationResult,
};
use crate::volume::Volume;

/// Volume and revenue derived from one counter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dispense {
    pub previous_counter: Volume,
    pub new_counter: Volume,
    pub volume_dispensed: Volume,
    pub price_per_liter: Money,
    pub revenue: Money,
}

/// Computes what a pump dispensed between two counter readings.
///
/// ## Errors
/// - `MustNotBeNegative` when either counter is below zero
/// - `CounterNotIncreasing` when `new_counter <= previous_counter`
/// - `OutOfRange` when the price is negative or the revenue overflows
pub fn compute_dispense(
    previous_counter: Volume,
    new_counter: Volume,
    price_per_liter: Money,
) -> ValidationResult<Dispense> {
    validate_non_negative("previous_counter", previous_counter.milliliters())?;
    validate_non_negative("new_counter", new_counter.milliliters())?;
    validate_counter_advance(previous_counter, new_counter)?;
    validate_price_cents("price_per_liter", price_per_liter.cents())?;

    let volume_dispensed = new_counter
        .checked_sub(previous_counter)
        .ok_or_else(|| out_of_range("volume_dispensed"))?;
    let revenue = volume_dispensed
        .checked_priced_at(price_per_liter)
        .ok_or_else(|| out_of_range("revenue"))?;

    Ok(Dispense {
        previous_counter,
        new_counter,
        volume_dispensed,
        price_per_liter,
        revenue,
    })
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

impl Dispense {
    /// Builds the fuel sale this dispense records.
    pub fn to_sale(&self, pump_id: &str, payment_method: PaymentMethod) -> Sale {
        Sale::fuel(
            pump_id,
            self.volume_dispensed,
            self.price_per_liter,
            payment_method,
        )
    }
}

/// A counter reading submitted by an operator.
///
/// `previous_counter` is the total the operator saw when they read the pump.
/// If another reading was committed in between, the write is rejected as stale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CounterReading {
    pub pump_id: String,
    pub previous_counter: Volume,
    pub new_counter: Volume,
    #[serde(default = "fuel_counter")]
    pub payment_method: PaymentMethod,
}

fn fuel_counter() -> PaymentMethod {
    PaymentMethod::FuelCounter
}

impl CounterReading {
    pub fn new(pump_id: impl Into<String>, previous_counter: Volume, new_counter: Volume) -> Self {
        CounterReading {
            pump_id: pump_id.into(),
            previous_counter,
            new_counter,
            payment_method: PaymentMethod::FuelCounter,
        }
    }

    pub fn with_payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }
}

/// Everything a committed reconciliation changed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CounterReconciliation {
    pub volume_dispensed: Volume,
    pub revenue: Money,
    pub sale: Sale,
    pub pump: Pump,
    pub container: Option<Container>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleType;

    #[test]
    fn test_dispense_50_liters_at_145() {
        let d = compute_dispense(
            Volume::from_liters(4250),
            Volume::from_liters(4300),
            Money::from_cents(145),
        )
        .unwrap();

        assert_eq!(d.volume_dispensed, Volume::from_liters(50));
        assert_eq!(d.revenue, Money::from_cents(7250));
    }

    #[test]
    fn test_counter_going_backwards_is_rejected() {
        let err = compute_dispense(
            Volume::from_liters(4250),
            Volume::from_liters(4200),
            Money::from_cents(145),
        )
        .unwrap_err();

        assert!(matches!(err, ValidationError::CounterNotIncreasing { .. }));
    }

    #[test]
    fn test_equal_counter_is_rejected() {
        assert!(compute_dispense(
            Volume::from_liters(100),
            Volume::from_liters(100),
            Money::from_cents(145),
        )
        .is_err());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = compute_dispense(
            Volume::from_liters(100),
            Volume::from_liters(110),
            Money::from_cents(-1),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_negative_counter_is_rejected() {
        let err = compute_dispense(
            Volume::from_milliliters(-1),
            Volume::from_milliliters(i64::MAX),
            Money::from_cents(145),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MustNotBeNegative { ref field } if field == "previous_counter"
        ));
    }

    #[test]
    fn test_revenue_overflow_is_rejected() {
        let err = compute_dispense(
            Volume::zero(),
            Volume::from_milliliters(i64::MAX / 2),
            Money::from_cents(4000),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { ref field, .. } if field == "revenue"
        ));
    }

    #[test]
    fn test_zero_price_records_free_fuel() {
        let d = compute_dispense(Volume::zero(), Volume::from_liters(10), Money::zero()).unwrap();
        assert_eq!(d.revenue, Money::zero());
    }

    #[test]
    fn test_fractional_volume_rounds_revenue() {
        // 0.333 L at 1.45 = 0.48285 → 48 cents
        let d = compute_dispense(
            Volume::from_milliliters(1_000),
            Volume::from_milliliters(1_333),
            Money::from_cents(145),
        )
        .unwrap();
        assert_eq!(d.revenue.cents(), 48);
    }

    #[test]
    fn test_to_sale_matches_dispense() {
        let d = compute_dispense(
            Volume::from_liters(4250),
            Volume::from_liters(4300),
            Money::from_cents(145),
        )
        .unwrap();
        let sale = d.to_sale("pump-a", PaymentMethod::FuelCounter);

        assert_eq!(sale.sale_type, SaleType::Fuel);
        assert_eq!(sale.pump_id.as_deref(), Some("pump-a"));
        assert_eq!(sale.quantity, d.volume_dispensed.milliliters());
        assert_eq!(sale.total_cents, d.revenue.cents());
        assert_eq!(sale.payment_method, PaymentMethod::FuelCounter);
    }

    #[test]
    fn test_reading_defaults_to_fuel_counter_payment() {
        let json = r#"{"pump_id":"p","previous_counter":1000,"new_counter":2000}"#;
        let reading: CounterReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.payment_method, PaymentMethod::FuelCounter);
        assert_eq!(reading.new_counter, Volume::from_liters(2));
    }
}
