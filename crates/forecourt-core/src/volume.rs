//! # Volume Module
//!
//! Fuel volume in integer millilitres.
//!
//! Pump counters, container levels and fuel sale quantities all flow
//! through this type. A litre is the display unit; prices are quoted in
//! cents per litre.
//!
//! ```rust
//! use forecourt_core::{Money, Volume};
//!
//! let sold = Volume::from_liters(50);
//! let revenue = sold.priced_at(Money::from_cents(145));
//! assert_eq!(revenue.cents(), 7250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::money::Money;

const ML_PER_LITER: i64 = 1000;

/// A volume of fuel in millilitres.
///
/// Signed: a container level may go below zero when dispensed volume
/// exceeds what was recorded as delivered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Volume(i64);

impl Volume {
    #[inline]
    pub const fn from_milliliters(ml: i64) -> Self {
        Volume(ml)
    }

    #[inline]
    pub const fn from_liters(liters: i64) -> Self {
        Volume(liters * ML_PER_LITER)
    }

    #[inline]
    pub const fn milliliters(&self) -> i64 {
        self.0
    }

    /// Whole litres, truncated toward zero.
    #[inline]
    pub const fn whole_liters(&self) -> i64 {
        self.0 / ML_PER_LITER
    }

    /// Litres as a float. Display only.
    #[inline]
    pub fn liters_f64(&self) -> f64 {
        self.0 as f64 / ML_PER_LITER as f64
    }

    #[inline]
    pub const fn zero() -> Self {
        Volume(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the volume, or zero if negative.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Volume(0)
        } else {
            *self
        }
    }

    /// Subtraction that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_sub(&self, other: Volume) -> Option<Volume> {
        match self.0.checked_sub(other.0) {
            Some(ml) => Some(Volume(ml)),
            None => None,
        }
    }

    /// Prices this volume at a per-litre rate.
    ///
    /// ## Rounding
    /// Half a cent rounds away from zero. The product is computed in i128;
    /// `None` when the rounded amount does not fit in i64 cents.
    ///
    /// ```rust
    /// use forecourt_core::{Money, Volume};
    ///
    /// // 1.5 L at $1.45/L = $2.175 → $2.18
    /// let revenue = Volume::from_milliliters(1500).checked_priced_at(Money::from_cents(145));
    /// assert_eq!(revenue.map(|m| m.cents()), Some(218));
    /// ```
    pub fn checked_priced_at(&self, price_per_liter: Money) -> Option<Money> {
        let product = self.0 as i128 * price_per_liter.cents() as i128;
        i64::try_from(div_round_half_away(product, ML_PER_LITER as i128))
            .ok()
            .map(Money::from_cents)
    }

    /// Prices this volume at a per-litre rate, saturating at the i64 bounds.
    ///
    /// For amounts already validated through [`Volume::checked_priced_at`].
    pub fn priced_at(&self, price_per_liter: Money) -> Money {
        self.checked_priced_at(price_per_liter).unwrap_or_else(|| {
            let negative = (self.0 < 0) != (price_per_liter.cents() < 0);
            Money::from_cents(if negative { i64::MIN } else { i64::MAX })
        })
    }
}

/// Integer division rounding half away from zero.
pub(crate) fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if (numerator < 0) != (denominator < 0) {
        (numerator - half) / denominator
    } else {
        (numerator + half) / denominator
    }
}

/// Display shows litres with millilitre precision: `4250.000 L`.
impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:03} L",
            sign,
            (self.0 / ML_PER_LITER).abs(),
            (self.0 % ML_PER_LITER).abs()
        )
    }
}

impl Add for Volume {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Volume(self.0 + other.0)
    }
}

impl AddAssign for Volume {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Volume {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Volume(self.0 - other.0)
    }
}

impl SubAssign for Volume {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Volume {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Volume(-self.0)
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Self {
        iter.fold(Volume::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liters_and_milliliters() {
        let v = Volume::from_liters(50);
        assert_eq!(v.milliliters(), 50_000);
        assert_eq!(v.whole_liters(), 50);
        assert!((v.liters_f64() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(Volume::from_liters(4250).to_string(), "4250.000 L");
        assert_eq!(Volume::from_milliliters(1505).to_string(), "1.505 L");
        assert_eq!(Volume::from_milliliters(-2500).to_string(), "-2.500 L");
    }

    #[test]
    fn test_priced_at_exact() {
        let revenue = Volume::from_liters(50).priced_at(Money::from_cents(145));
        assert_eq!(revenue.cents(), 7250);
    }

    #[test]
    fn test_priced_at_rounds_half_away_from_zero() {
        // 10 mL at 150 ¢/L = 1.5 ¢ → 2 ¢
        assert_eq!(
            Volume::from_milliliters(10)
                .priced_at(Money::from_cents(150))
                .cents(),
            2
        );
        // 9 mL at 150 ¢/L = 1.35 ¢ → 1 ¢
        assert_eq!(
            Volume::from_milliliters(9)
                .priced_at(Money::from_cents(150))
                .cents(),
            1
        );
        assert_eq!(
            Volume::from_milliliters(-10)
                .priced_at(Money::from_cents(150))
                .cents(),
            -2
        );
    }

    #[test]
    fn test_checked_priced_at_overflow() {
        let huge = Volume::from_milliliters(i64::MAX / 2);
        assert_eq!(huge.checked_priced_at(Money::from_cents(4000)), None);
        assert_eq!(
            huge.priced_at(Money::from_cents(4000)).cents(),
            i64::MAX
        );
        assert_eq!(
            Volume::from_liters(50).checked_priced_at(Money::from_cents(145)),
            Some(Money::from_cents(7250))
        );
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(
            Volume::from_liters(4300).checked_sub(Volume::from_liters(4250)),
            Some(Volume::from_liters(50))
        );
        assert_eq!(
            Volume::from_milliliters(i64::MAX).checked_sub(Volume::from_milliliters(-1)),
            None
        );
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Volume::from_liters(-3).non_negative(), Volume::zero());
        assert_eq!(Volume::from_liters(3).non_negative(), Volume::from_liters(3));
    }
}
