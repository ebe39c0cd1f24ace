//! # Reports
//!
//! Aggregates shown on the dashboard and reports pages.
//!
//! Day boundaries are UTC midnights. A day covers `[start, end)`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Expense, Sale, SaleType};

/// Returns the `[start, end)` UTC instants of a calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

// =============================================================================
// Dashboard Stats
// =============================================================================

/// Headline numbers for a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub fuel_sales_cents: i64,
    pub product_sales_cents: i64,
    pub total_sales_cents: i64,
    pub total_expenses_cents: i64,
    pub net_profit_cents: i64,
    pub sales_count: i64,
}

impl DashboardStats {
    /// Sums a day's sales and expenses.
    pub fn tally(sales: &[Sale], expenses: &[Expense]) -> Self {
        let mut fuel = Money::zero();
        let mut product = Money::zero();
        for sale in sales {
            match sale.sale_type {
                SaleType::Fuel => fuel += sale.total(),
                SaleType::Product => product += sale.total(),
            }
        }
        let total_expenses: Money = expenses.iter().map(Expense::amount).sum();
        let total_sales = fuel + product;

        DashboardStats {
            fuel_sales_cents: fuel.cents(),
            product_sales_cents: product.cents(),
            total_sales_cents: total_sales.cents(),
            total_expenses_cents: total_expenses.cents(),
            net_profit_cents: (total_sales - total_expenses).cents(),
            sales_count: sales.len() as i64,
        }
    }

    pub fn net_profit(&self) -> Money {
        Money::from_cents(self.net_profit_cents)
    }
}

// =============================================================================
// Daily Summary
// =============================================================================

/// End-of-day figures for the reports page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_fuel_sales_cents: i64,
    pub total_product_sales_cents: i64,
    pub total_expenses_cents: i64,
    pub net_profit_cents: i64,
}

impl DailySummary {
    pub fn from_stats(date: NaiveDate, stats: &DashboardStats) -> Self {
        DailySummary {
            date,
            total_fuel_sales_cents: stats.fuel_sales_cents,
            total_product_sales_cents: stats.product_sales_cents,
            total_expenses_cents: stats.total_expenses_cents,
            net_profit_cents: stats.net_profit_cents,
        }
    }
}

// =============================================================================
// Breakdowns
// =============================================================================

/// Fuel volume and revenue for one fuel type over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FuelTypeSales {
    pub fuel_type: String,
    pub volume_ml: i64,
    pub revenue_cents: i64,
    pub sale_count: i64,
}

/// Throughput of one pump over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PumpPerformance {
    pub pump_id: String,
    pub pump_name: String,
    pub fuel_type: String,
    pub volume_ml: i64,
    pub revenue_cents: i64,
    pub sale_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use crate::volume::Volume;

    fn expense(cents: i64) -> Expense {
        let now = Utc::now();
        Expense {
            id: "e".to_string(),
            category: "Utilities".to_string(),
            description: "Power".to_string(),
            amount_cents: cents,
            payment_method: PaymentMethod::Cash,
            receipt_number: None,
            vendor: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tally_splits_fuel_and_product() {
        let sales = vec![
            Sale::fuel(
                "p",
                Volume::from_liters(50),
                Money::from_cents(145),
                PaymentMethod::FuelCounter,
            ),
            Sale::product("x", 2, Money::from_cents(350), PaymentMethod::Cash),
        ];
        let stats = DashboardStats::tally(&sales, &[expense(1000)]);

        assert_eq!(stats.fuel_sales_cents, 7250);
        assert_eq!(stats.product_sales_cents, 700);
        assert_eq!(stats.total_sales_cents, 7950);
        assert_eq!(stats.total_expenses_cents, 1000);
        assert_eq!(stats.net_profit_cents, 6950);
        assert_eq!(stats.sales_count, 2);
    }

    #[test]
    fn test_tally_empty_day() {
        assert_eq!(DashboardStats::tally(&[], &[]), DashboardStats::default());
    }

    #[test]
    fn test_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let (start, end) = day_bounds(day);
        assert_eq!(start.to_rfc3339(), "2026-10-15T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }
}
