//! Dashboard and graph aggregation.
//!
//! Both views read one date window and bucket it in memory: the dashboard by
//! day over the trailing week, the graphs by week over the trailing three weeks.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tallybook_core::UserId;

use crate::db::{MetricRepository, RepositoryError};
use crate::models::DailyMetric;

/// Days in the dashboard series.
pub const DASHBOARD_DAYS: usize = 7;

/// Weeks in the graph series.
pub const GRAPH_WEEKS: usize = 3;

/// Home screen summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub user_name: String,
    pub yesterday_sales: Decimal,
    pub yesterday_cash: Decimal,
    /// Oldest to newest, `[today-6, today]`, zero-filled.
    pub sales_data: Vec<Decimal>,
    pub cash_data: Vec<Decimal>,
}

/// Three-week comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphData {
    /// Oldest to newest; the last week ends today.
    pub weekly_sales: Vec<Decimal>,
    pub weekly_cash: Vec<Decimal>,
    pub total_sales: Decimal,
    pub total_cash: Decimal,
}

/// Dashboard/graph service.
pub struct DashboardService<'a> {
    metrics: MetricRepository<'a>,
}

impl<'a> DashboardService<'a> {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            metrics: MetricRepository::new(pool),
        }
    }

    /// Yesterday's figures and the trailing 7-day series.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database fails.
    pub async fn stats(
        &self,
        user_id: UserId,
        user_name: &str,
        today: NaiveDate,
    ) -> Result<DashboardStats, RepositoryError> {
        let start = days_before(today, DASHBOARD_DAYS - 1);
        let rows = self.metrics.list_between(user_id, start, today).await?;
        Ok(build_stats(user_name, &rows, today))
    }

    /// Weekly totals for the last three weeks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database fails.
    pub async fn graphs(&self, user_id: UserId, today: NaiveDate) -> Result<GraphData, RepositoryError> {
        let start = days_before(today, GRAPH_WEEKS * 7 - 1);
        let rows = self.metrics.list_between(user_id, start, today).await?;
        Ok(build_graphs(&rows, today))
    }
}

fn days_before(date: NaiveDate, days: usize) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::try_from(days).unwrap_or(u64::MAX)))
        .unwrap_or(NaiveDate::MIN)
}

/// Whole days from `earlier` to `later`, or `None` when `earlier` is after `later`.
fn days_between(earlier: NaiveDate, later: NaiveDate) -> Option<usize> {
    usize::try_from((later - earlier).num_days()).ok()
}

/// Bucket rows into the dashboard view. Rows outside `[today-6, today]` are ignored.
#[must_use]
pub fn build_stats(user_name: &str, rows: &[DailyMetric], today: NaiveDate) -> DashboardStats {
    let start = days_before(today, DASHBOARD_DAYS - 1);
    let yesterday = days_before(today, 1);

    let mut sales_data = vec![Decimal::ZERO; DASHBOARD_DAYS];
    let mut cash_data = vec![Decimal::ZERO; DASHBOARD_DAYS];
    let mut yesterday_sales = Decimal::ZERO;
    let mut yesterday_cash = Decimal::ZERO;

    for row in rows {
        if row.date == yesterday {
            yesterday_sales = row.sales;
            yesterday_cash = row.cash;
        }
        let Some(slot) = days_between(start, row.date) else {
            continue;
        };
        if let (Some(sales), Some(cash)) = (sales_data.get_mut(slot), cash_data.get_mut(slot)) {
            *sales = row.sales;
            *cash = row.cash;
        }
    }

    DashboardStats {
        user_name: user_name.to_owned(),
        yesterday_sales,
        yesterday_cash,
        sales_data,
        cash_data,
    }
}

/// Bucket rows into three consecutive 7-day windows ending `today`.
#[must_use]
pub fn build_graphs(rows: &[DailyMetric], today: NaiveDate) -> GraphData {
    let start = days_before(today, GRAPH_WEEKS * 7 - 1);

    let mut weekly_sales = vec![Decimal::ZERO; GRAPH_WEEKS];
    let mut weekly_cash = vec![Decimal::ZERO; GRAPH_WEEKS];

    for row in rows {
        let Some(week) = days_between(start, row.date).map(|offset| offset / 7) else {
            continue;
        };
        if let (Some(sales), Some(cash)) = (weekly_sales.get_mut(week), weekly_cash.get_mut(week)) {
            *sales += row.sales;
            *cash += row.cash;
        }
    }

    GraphData {
        total_sales: weekly_sales.iter().copied().sum(),
        total_cash: weekly_cash.iter().copied().sum(),
        weekly_sales,
        weekly_cash,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use tallybook_core::{MetricId, MetricSource};

    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn metric(date: &str, sales: &str, cash: &str) -> DailyMetric {
        DailyMetric {
            id: MetricId::new(1),
            user_id: UserId::new(1),
            date: day(date),
            sales: dec(sales),
            cash: dec(cash),
            source: MetricSource::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_empty() {
        let stats = build_stats("Marie", &[], day("2026-05-20"));
        assert_eq!(stats.user_name, "Marie");
        assert_eq!(stats.yesterday_sales, Decimal::ZERO);
        assert_eq!(stats.yesterday_cash, Decimal::ZERO);
        assert_eq!(stats.sales_data, vec![Decimal::ZERO; 7]);
        assert_eq!(stats.cash_data, vec![Decimal::ZERO; 7]);
    }

    #[test]
    fn test_stats_places_days_oldest_first() {
        let rows = [
            metric("2026-05-20", "700", "70"),
            metric("2026-05-19", "600", "60"),
            metric("2026-05-14", "100", "10"),
            metric("2026-05-13", "999", "99"),
        ];
        let stats = build_stats("Marie", &rows, day("2026-05-20"));

        assert_eq!(stats.yesterday_sales, dec("600"));
        assert_eq!(stats.yesterday_cash, dec("60"));
        assert_eq!(
            stats.sales_data,
            vec![
                dec("100"),
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                dec("600"),
                dec("700"),
            ]
        );
        assert_eq!(stats.cash_data[0], dec("10"));
        assert_eq!(stats.cash_data[6], dec("70"));
    }

    #[test]
    fn test_graphs_week_boundaries() {
        let today = day("2026-05-21");
        let rows = [
            // week 0: [05-01, 05-07]
            metric("2026-05-01", "10.10", "1"),
            metric("2026-05-07", "20.20", "2"),
            // week 1: [05-08, 05-14]
            metric("2026-05-08", "30.30", "3"),
            // week 2: [05-15, 05-21]
            metric("2026-05-21", "40.40", "4"),
            // outside
            metric("2026-04-30", "1000", "1000"),
        ];
        let graphs = build_graphs(&rows, today);

        assert_eq!(graphs.weekly_sales, vec![dec("30.30"), dec("30.30"), dec("40.40")]);
        assert_eq!(graphs.weekly_cash, vec![dec("3"), dec("3"), dec("4")]);
        assert_eq!(graphs.total_sales, dec("101.00"));
        assert_eq!(graphs.total_cash, dec("10"));
    }

    #[test]
    fn test_graphs_totals_match_weeks() {
        let today = day("2026-05-21");
        let rows: Vec<_> = (0..21)
            .map(|i| {
                let date = days_before(today, i).to_string();
                metric(&date, &format!("{}.33", i + 1), "0.01")
            })
            .collect();
        let graphs = build_graphs(&rows, today);

        let weekly: Decimal = graphs.weekly_sales.iter().copied().sum();
        assert_eq!(weekly, graphs.total_sales);
        assert_eq!(graphs.total_cash, dec("0.21"));
    }

    #[test]
    fn test_graphs_empty() {
        let graphs = build_graphs(&[], day("2026-05-21"));
        assert_eq!(graphs.weekly_sales, vec![Decimal::ZERO; 3]);
        assert_eq!(graphs.total_sales, Decimal::ZERO);
    }
}
