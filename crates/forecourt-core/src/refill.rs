//! # Container Refill
//!
//! Plans a fuel delivery into a container: how much fits, what the tank
//! level becomes, and the new weighted-average cost of the fuel in it.
//!
//! ```text
//!   capacity 10 000 L, level 9 500 L, delivery 800 L
//!        │
//!        ▼
//!   headroom = 500 L ──► accepted 500 L, rejected 300 L
//!        │
//!        ▼
//!   avg cost = (9 500 × old + 500 × new) / 10 000
//! ```
//!
//! A level below zero (more dispensed than delivered) counts as empty for
//! both headroom and cost averaging.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Container, Expense, FuelPurchase, PaymentMethod};
use crate::validation::{validate_optional_text, validate_positive, validate_price_cents};
use crate::volume::{div_round_half_away, Volume};

/// A delivery request for one container.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefillRequest {
    pub container_id: String,
    pub volume: Volume,
    pub cost_per_liter: Money,
    pub supplier: Option<String>,
    /// How the delivery was paid; recorded on the matching expense.
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// The computed effect of a delivery on a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefillPlan {
    pub requested: Volume,
    /// Volume that fits and is recorded.
    pub accepted: Volume,
    /// Overflow that did not fit.
    pub rejected: Volume,
    pub new_level: Volume,
    pub new_avg_cost_per_liter: Money,
    /// Cost of the accepted volume.
    pub total_cost: Money,
}

/// Computes how a delivery lands in a container.
///
/// ## Errors
/// - `Validation` if the volume is not positive or the cost is negative
/// - `ContainerFull` if nothing fits
pub fn plan_refill(
    container: &Container,
    requested: Volume,
    cost_per_liter: Money,
) -> CoreResult<RefillPlan> {
    validate_positive("volume", requested.milliliters())?;
    validate_price_cents("cost_per_liter", cost_per_liter.cents())?;

    let headroom = container.headroom();
    if !headroom.is_positive() {
        return Err(CoreError::ContainerFull {
            container_id: container.id.clone(),
        });
    }

    let accepted = requested.min(headroom);
    let rejected = requested - accepted;

    let prior = container.current_level().non_negative();
    let weighted = prior.milliliters() as i128 * container.avg_cost_cents_per_liter as i128
        + accepted.milliliters() as i128 * cost_per_liter.cents() as i128;
    let new_avg = div_round_half_away(weighted, (prior + accepted).milliliters() as i128);
    let total_cost = accepted.checked_priced_at(cost_per_liter).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "cost_per_liter".to_string(),
            min: 0,
            max: i64::MAX,
        }
    })?;

    Ok(RefillPlan {
        requested,
        accepted,
        rejected,
        new_level: container.current_level() + accepted,
        new_avg_cost_per_liter: Money::from_cents(new_avg as i64),
        total_cost,
    })
}

impl RefillRequest {
    pub fn validate(&self) -> CoreResult<()> {
        validate_positive("volume", self.volume.milliliters())?;
        validate_price_cents("cost_per_liter", self.cost_per_liter.cents())?;
        validate_optional_text("supplier", self.supplier.as_deref(), 200)?;
        Ok(())
    }
}

/// Everything a committed refill wrote.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefillOutcome {
    pub plan: RefillPlan,
    pub container: Container,
    pub purchase: FuelPurchase,
    pub expense: Expense,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tank(capacity_l: i64, level_ml: i64, avg_cost: i64) -> Container {
        let now = Utc::now();
        Container {
            id: "tank-1".to_string(),
            name: "Tank 1".to_string(),
            fuel_type: "Regular".to_string(),
            capacity_ml: capacity_l * 1000,
            current_level_ml: level_ml,
            avg_cost_cents_per_liter: avg_cost,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_refill_within_capacity() {
        let c = tank(10_000, 7_500_000, 120);
        let plan = plan_refill(&c, Volume::from_liters(2_000), Money::from_cents(130)).unwrap();

        assert_eq!(plan.accepted, Volume::from_liters(2_000));
        assert_eq!(plan.rejected, Volume::zero());
        assert_eq!(plan.new_level, Volume::from_liters(9_500));
        assert_eq!(plan.total_cost.cents(), 260_000);
        // (7500 × 120 + 2000 × 130) / 9500 = 122.105… → 122
        assert_eq!(plan.new_avg_cost_per_liter.cents(), 122);
    }

    #[test]
    fn test_refill_clamps_to_capacity() {
        let c = tank(10_000, 9_500_000, 120);
        let plan = plan_refill(&c, Volume::from_liters(800), Money::from_cents(130)).unwrap();

        assert_eq!(plan.accepted, Volume::from_liters(500));
        assert_eq!(plan.rejected, Volume::from_liters(300));
        assert_eq!(plan.new_level, c.capacity());
        assert_eq!(plan.total_cost.cents(), 65_000);
    }

    #[test]
    fn test_refill_full_container_fails() {
        let c = tank(5_000, 5_000_000, 120);
        let err = plan_refill(&c, Volume::from_liters(1), Money::from_cents(130)).unwrap_err();
        assert!(matches!(err, CoreError::ContainerFull { .. }));
    }

    #[test]
    fn test_refill_negative_level_counts_as_empty() {
        let c = tank(1_000, -50_000, 999);
        let plan = plan_refill(&c, Volume::from_liters(2_000), Money::from_cents(140)).unwrap();

        assert_eq!(plan.accepted, Volume::from_liters(1_000));
        assert_eq!(plan.new_level, Volume::from_liters(950));
        // prior cost does not leak in from a phantom negative level
        assert_eq!(plan.new_avg_cost_per_liter.cents(), 140);
    }

    #[test]
    fn test_refill_rejects_bad_input() {
        let c = tank(1_000, 0, 0);
        assert!(matches!(
            plan_refill(&c, Volume::zero(), Money::from_cents(100)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            plan_refill(&c, Volume::from_liters(1), Money::from_cents(-5)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            plan_refill(&c, Volume::from_liters(2), Money::from_cents(i64::MAX)),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }
}
