//! Daily metric repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tallybook_core::{MetricId, MetricSource, UserId};

use super::RepositoryError;
use crate::models::DailyMetric;

const METRIC_COLUMNS: &str =
    "id, user_id, metric_date, sales, cash, source, created_at, updated_at";

/// Internal row type for `PostgreSQL` metric queries.
#[derive(Debug, sqlx::FromRow)]
struct MetricRow {
    id: i32,
    user_id: i32,
    metric_date: NaiveDate,
    sales: Decimal,
    cash: Decimal,
    source: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MetricRow> for DailyMetric {
    fn from(row: MetricRow) -> Self {
        Self {
            id: MetricId::new(row.id),
            user_id: UserId::new(row.user_id),
            date: row.metric_date,
            sales: row.sales,
            cash: row.cash,
            source: MetricSource::from_stored(row.source),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    metric: MetricRow,
    inserted: bool,
}

/// Repository for daily metric database operations.
pub struct MetricRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MetricRepository<'a> {
    /// Create a new metric repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the metric for `(user, date)` or overwrite the existing one.
    ///
    /// Returns the stored row and whether it was newly inserted. Concurrent
    /// submissions for the same day collapse into a single row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        date: NaiveDate,
        sales: Decimal,
        cash: Decimal,
        source: &MetricSource,
    ) -> Result<(DailyMetric, bool), RepositoryError> {
        let row = sqlx::query_as::<_, UpsertRow>(&format!(
            r"
            INSERT INTO daily_metrics (user_id, metric_date, sales, cash, source)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, metric_date) DO UPDATE
            SET sales = EXCLUDED.sales,
                cash = EXCLUDED.cash,
                source = EXCLUDED.source,
                updated_at = NOW()
            RETURNING {METRIC_COLUMNS}, (xmax = 0) AS inserted
            "
        ))
        .bind(user_id)
        .bind(date)
        .bind(sales)
        .bind(cash)
        .bind(source.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok((row.metric.into(), row.inserted))
    }

    /// Get the metric for a single day, if one was entered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_date(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<DailyMetric>, RepositoryError> {
        let row = sqlx::query_as::<_, MetricRow>(&format!(
            "SELECT {METRIC_COLUMNS} FROM daily_metrics WHERE user_id = $1 AND metric_date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Metrics in the inclusive window `[start, end]`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_between(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyMetric>, RepositoryError> {
        let rows = sqlx::query_as::<_, MetricRow>(&format!(
            r"
            SELECT {METRIC_COLUMNS}
            FROM daily_metrics
            WHERE user_id = $1 AND metric_date BETWEEN $2 AND $3
            ORDER BY metric_date DESC
            "
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
