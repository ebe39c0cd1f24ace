//! # Report Service
//!
//! Aggregates for the dashboard and the reports page. All periods are
//! half-open `[from, to)` in UTC.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::error::DbResult;
use crate::repository::{expense, sale};
use forecourt_core::report::{
    day_bounds, DailySummary, DashboardStats, FuelTypeSales, PumpPerformance,
};

/// Service for read-only report queries.
#[derive(Debug, Clone)]
pub struct ReportService {
    pool: SqlitePool,
}

impl ReportService {
    pub fn new(pool: SqlitePool) -> Self {
        ReportService { pool }
    }

    /// Sales and expense totals for one UTC day.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self, day: NaiveDate) -> DbResult<DashboardStats> {
        let (from, to) = day_bounds(day);
        let sales = sale::between(&self.pool, from, to).await?;
        let expenses = expense::between(&self.pool, from, to).await?;

        debug!(sales = sales.len(), expenses = expenses.len(), "Tallying day");
        Ok(DashboardStats::tally(&sales, &expenses))
    }

    pub async fn daily_summary(&self, day: NaiveDate) -> DbResult<DailySummary> {
        let stats = self.dashboard_stats(day).await?;
        Ok(DailySummary::from_stats(day, &stats))
    }

    /// Fuel volume and revenue per fuel type, by the selling pump's fuel.
    #[instrument(skip(self))]
    pub async fn fuel_sales_by_type(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<FuelTypeSales>> {
        let rows = sqlx::query_as::<_, FuelTypeSales>(
            r#"
            SELECT p.fuel_type AS fuel_type,
                   COALESCE(SUM(s.quantity), 0) AS volume_ml,
                   COALESCE(SUM(s.total_cents), 0) AS revenue_cents,
                   COUNT(s.id) AS sale_count
            FROM sales s
            JOIN pumps p ON p.id = s.pump_id
            WHERE s.sale_type = 'fuel'
              AND s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY p.fuel_type
            ORDER BY revenue_cents DESC, p.fuel_type
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-pump throughput. Pumps with no sales in the period report zeros.
    #[instrument(skip(self))]
    pub async fn pump_performance(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<PumpPerformance>> {
        let rows = sqlx::query_as::<_, PumpPerformance>(
            r#"
            SELECT p.id AS pump_id,
                   p.name AS pump_name,
                   p.fuel_type AS fuel_type,
                   COALESCE(SUM(s.quantity), 0) AS volume_ml,
                   COALESCE(SUM(s.total_cents), 0) AS revenue_cents,
                   COUNT(s.id) AS sale_count
            FROM pumps p
            LEFT JOIN sales s
                   ON s.pump_id = p.id
                  AND s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY p.id, p.name, p.fuel_type
            ORDER BY volume_ml DESC, p.name
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use forecourt_core::cart::Cart;
    use forecourt_core::reconciliation::CounterReading;
    use forecourt_core::report::day_bounds;
    use forecourt_core::{Money, NewExpense, NewProduct, NewPump, PaymentMethod, Volume};

    async fn pump(db: &Database, name: &str, fuel: &str) -> forecourt_core::Pump {
        db.pumps()
            .insert(&NewPump {
                name: name.to_string(),
                container_id: None,
                fuel_type: fuel.to_string(),
                total_counter_ml: 0,
                is_active: true,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_and_breakdowns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = pump(&db, "Pump A", "Regular").await;
        let b = pump(&db, "Pump B", "Diesel").await;
        let idle = pump(&db, "Pump C", "Premium").await;

        db.counters()
            .reconcile(
                &CounterReading::new(&a.id, Volume::zero(), Volume::from_liters(50)),
                Money::from_cents(145),
            )
            .await
            .unwrap();
        db.counters()
            .reconcile(
                &CounterReading::new(&b.id, Volume::zero(), Volume::from_liters(20)),
                Money::from_cents(152),
            )
            .await
            .unwrap();

        let oil = db
            .products()
            .insert(&NewProduct {
                barcode: "2001".to_string(),
                name: "Motor Oil".to_string(),
                category: "Automotive".to_string(),
                cost_price_cents: 500,
                sale_price_cents: 899,
                current_stock: 4,
                min_stock_level: 1,
            })
            .await
            .unwrap();
        let mut cart = Cart::new();
        cart.add_item(&oil, 2).unwrap();
        db.checkout().checkout(&cart, PaymentMethod::Cash).await.unwrap();

        db.expenses()
            .insert(&NewExpense {
                category: "Utilities".to_string(),
                description: "Electricity".to_string(),
                amount_cents: 5_000,
                payment_method: PaymentMethod::BankTransfer,
                receipt_number: None,
                vendor: None,
            })
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let stats = db.reports().dashboard_stats(today).await.unwrap();
        assert_eq!(stats.fuel_sales_cents, 7_250 + 3_040);
        assert_eq!(stats.product_sales_cents, 1_798);
        assert_eq!(stats.total_sales_cents, 12_088);
        assert_eq!(stats.total_expenses_cents, 5_000);
        assert_eq!(stats.net_profit_cents, 7_088);
        assert_eq!(stats.sales_count, 3);

        let summary = db.reports().daily_summary(today).await.unwrap();
        assert_eq!(summary.date, today);
        assert_eq!(summary.net_profit_cents, 7_088);

        let yesterday = db
            .reports()
            .dashboard_stats(today - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(yesterday.sales_count, 0);

        let (from, to) = day_bounds(today);
        let by_type = db.reports().fuel_sales_by_type(from, to).await.unwrap();
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[0].fuel_type, "Regular");
        assert_eq!(by_type[0].volume_ml, 50_000);
        assert_eq!(by_type[1].revenue_cents, 3_040);

        let pumps = db.reports().pump_performance(from, to).await.unwrap();
        assert_eq!(pumps.len(), 3);
        assert_eq!(pumps[0].pump_id, a.id);
        let idle_row = pumps.iter().find(|p| p.pump_id == idle.id).unwrap();
        assert_eq!(idle_row.sale_count, 0);
        assert_eq!(idle_row.volume_ml, 0);
    }
}
