//! Daily metric entry, listing and day-over-day insights.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use tallybook_core::{MetricSource, MetricSourceError, UserId, percent_change};

use crate::db::{MetricRepository, RepositoryError};
use crate::models::{DailyMetric, MetricDeltas};

/// Window used when the client does not send `range`.
pub const DEFAULT_RANGE_DAYS: u32 = 10;

/// Largest accepted `range`.
pub const MAX_RANGE_DAYS: u32 = 366;

/// Largest amount a `NUMERIC(14,2)` column holds: 999 999 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Errors that can occur in metric operations.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("invalid range '{0}': expected e.g. 10d (1 to {MAX_RANGE_DAYS} days)")]
    InvalidRange(String),

    #[error("start and end must be provided together")]
    IncompleteWindow,

    #[error("start date must not be after end date")]
    InvertedWindow,

    #[error("{0} must not be negative")]
    NegativeValue(&'static str),

    #[error("{0} must not exceed {MAX_AMOUNT}")]
    ValueTooLarge(&'static str),

    #[error("{0} must have at most 2 decimal places")]
    TooPrecise(&'static str),

    #[error("invalid source: {0}")]
    InvalidSource(#[from] MetricSourceError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Parsed input for a metric submission.
#[derive(Debug, Clone)]
pub struct MetricInput<'a> {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub cash: Decimal,
    pub source: Option<&'a str>,
}

/// Which days a listing covers.
#[derive(Debug, Clone, Default)]
pub struct MetricWindow<'a> {
    /// `Nd` or `N`; ignored when `start`/`end` are given.
    pub range: Option<&'a str>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// A stored metric plus its change against the previous day.
#[derive(Debug, Clone)]
pub struct MetricWithDeltas {
    pub metric: DailyMetric,
    pub deltas: MetricDeltas,
}

/// Metric service.
pub struct MetricService<'a> {
    metrics: MetricRepository<'a>,
}

impl<'a> MetricService<'a> {
    /// Create a new metric service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            metrics: MetricRepository::new(pool),
        }
    }

    /// Store the figures for a day, overwriting an earlier entry for that day.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an amount the column cannot hold or an
    /// unknown source, `MetricError::Repository` if the database fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        input: MetricInput<'_>,
    ) -> Result<MetricWithDeltas, MetricError> {
        validate_amount("sales", input.sales)?;
        validate_amount("cash", input.cash)?;
        let source = MetricSource::parse(input.source)?;

        let (metric, inserted) = self
            .metrics
            .upsert(user_id, input.date, input.sales, input.cash, &source)
            .await?;

        tracing::info!(
            user_id = %user_id,
            date = %metric.date,
            inserted,
            "Daily metric saved"
        );

        let previous = match previous_day(metric.date) {
            Some(day) => self.metrics.get_for_date(user_id, day).await?,
            None => None,
        };
        let deltas = deltas_between(&metric, previous.as_ref());

        Ok(MetricWithDeltas { metric, deltas })
    }

    /// Metrics inside the requested window, newest first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad window, `MetricError::Repository`
    /// if the database fails.
    pub async fn list(
        &self,
        user_id: UserId,
        window: &MetricWindow<'_>,
        today: NaiveDate,
    ) -> Result<Vec<DailyMetric>, MetricError> {
        let (start, end) = resolve_window(window, today)?;
        Ok(self.metrics.list_between(user_id, start, end).await?)
    }

    /// Percentage change of `date` against the day before. Zero when either
    /// day has no entry.
    ///
    /// # Errors
    ///
    /// Returns `MetricError::Repository` if the database fails.
    pub async fn insights(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<MetricDeltas, MetricError> {
        let Some(current) = self.metrics.get_for_date(user_id, date).await? else {
            return Ok(MetricDeltas::default());
        };
        let Some(day_before) = previous_day(date) else {
            return Ok(MetricDeltas::default());
        };
        let Some(previous) = self.metrics.get_for_date(user_id, day_before).await? else {
            return Ok(MetricDeltas::default());
        };

        Ok(deltas_between(&current, Some(&previous)))
    }
}

fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(1))
}

/// Day-over-day change of `current` against `previous`.
#[must_use]
pub fn deltas_between(current: &DailyMetric, previous: Option<&DailyMetric>) -> MetricDeltas {
    MetricDeltas {
        sales: percent_change(current.sales, previous.map(|p| p.sales)),
        cash: percent_change(current.cash, previous.map(|p| p.cash)),
    }
}

/// Parse a range such as `10d` or `10` into a day count.
///
/// # Errors
///
/// Returns `MetricError::InvalidRange` for anything else, or a count outside
/// `1..=366`.
pub fn parse_range(raw: &str) -> Result<u32, MetricError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_suffix('d')
        .or_else(|| trimmed.strip_suffix('D'))
        .unwrap_or(trimmed);

    match digits.parse::<u32>() {
        Ok(days) if (1..=MAX_RANGE_DAYS).contains(&days) => Ok(days),
        _ => Err(MetricError::InvalidRange(raw.to_owned())),
    }
}

/// Resolve a listing window to inclusive `(start, end)` dates.
///
/// An explicit `start`/`end` pair wins over `range`; otherwise the window is
/// `[today - range, today]`.
///
/// # Errors
///
/// Returns a validation error for a malformed range, a lone `start` or `end`,
/// or `start > end`.
pub fn resolve_window(
    window: &MetricWindow<'_>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), MetricError> {
    match (window.start, window.end) {
        (Some(start), Some(end)) if start > end => Err(MetricError::InvertedWindow),
        (Some(start), Some(end)) => Ok((start, end)),
        (Some(_), None) | (None, Some(_)) => Err(MetricError::IncompleteWindow),
        (None, None) => {
            let days = window
                .range
                .map(parse_range)
                .transpose()?
                .unwrap_or(DEFAULT_RANGE_DAYS);
            let start = today
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN);
            Ok((start, today))
        }
    }
}

/// Check that an amount fits the stored `NUMERIC(14,2)` without rounding.
///
/// # Errors
///
/// Returns `MetricError::NegativeValue`, `MetricError::ValueTooLarge` or
/// `MetricError::TooPrecise` naming `field`.
pub fn validate_amount(field: &'static str, value: Decimal) -> Result<(), MetricError> {
    if value < Decimal::ZERO {
        return Err(MetricError::NegativeValue(field));
    }
    if value > MAX_AMOUNT {
        return Err(MetricError::ValueTooLarge(field));
    }
    if value.normalize().scale() > 2 {
        return Err(MetricError::TooPrecise(field));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use tallybook_core::MetricId;

    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn metric(date: &str, sales: &str, cash: &str) -> DailyMetric {
        DailyMetric {
            id: MetricId::new(1),
            user_id: UserId::new(1),
            date: day(date),
            sales: sales.parse().unwrap(),
            cash: cash.parse().unwrap(),
            source: MetricSource::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn amount(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_max_amount() {
        assert_eq!(MAX_AMOUNT, amount("999999999999.99"));
    }

    #[test]
    fn test_amounts_within_column() {
        for ok in ["0", "-0", "12.5", "321.50", "1.500", "999999999999.99"] {
            assert!(validate_amount("sales", amount(ok)).is_ok(), "{ok}");
        }
    }

    #[test]
    fn test_amounts_outside_column() {
        assert!(matches!(
            validate_amount("sales", amount("-0.01")),
            Err(MetricError::NegativeValue("sales"))
        ));
        assert!(matches!(
            validate_amount("sales", amount("1000000000000")),
            Err(MetricError::ValueTooLarge("sales"))
        ));
        assert!(matches!(
            validate_amount("cash", amount("10000000000000")),
            Err(MetricError::ValueTooLarge("cash"))
        ));
        assert!(matches!(
            validate_amount("cash", amount("10.005")),
            Err(MetricError::TooPrecise("cash"))
        ));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("10d").unwrap(), 10);
        assert_eq!(parse_range("7").unwrap(), 7);
        assert_eq!(parse_range(" 30D ").unwrap(), 30);
        assert!(parse_range("0d").is_err());
        assert!(parse_range("367d").is_err());
        assert!(parse_range("ten").is_err());
        assert!(parse_range("-3d").is_err());
    }

    #[test]
    fn test_default_window_is_ten_days() {
        let (start, end) = resolve_window(&MetricWindow::default(), day("2026-05-20")).unwrap();
        assert_eq!(start, day("2026-05-10"));
        assert_eq!(end, day("2026-05-20"));
    }

    #[test]
    fn test_explicit_window_overrides_range() {
        let window = MetricWindow {
            range: Some("3d"),
            start: Some(day("2026-01-01")),
            end: Some(day("2026-01-31")),
        };
        let (start, end) = resolve_window(&window, day("2026-05-20")).unwrap();
        assert_eq!((start, end), (day("2026-01-01"), day("2026-01-31")));
    }

    #[test]
    fn test_bad_windows() {
        let inverted = MetricWindow {
            range: None,
            start: Some(day("2026-02-01")),
            end: Some(day("2026-01-01")),
        };
        assert!(matches!(
            resolve_window(&inverted, day("2026-05-20")),
            Err(MetricError::InvertedWindow)
        ));

        let lone = MetricWindow {
            range: None,
            start: Some(day("2026-02-01")),
            end: None,
        };
        assert!(matches!(
            resolve_window(&lone, day("2026-05-20")),
            Err(MetricError::IncompleteWindow)
        ));
    }

    #[test]
    fn test_deltas_against_previous_day() {
        let today = metric("2026-05-20", "1200", "960");
        let yesterday = metric("2026-05-19", "1000", "800");
        let deltas = deltas_between(&today, Some(&yesterday));
        assert!((deltas.sales - 20.0).abs() < 0.01);
        assert!((deltas.cash - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_deltas_without_previous_or_zero_previous() {
        let today = metric("2026-05-20", "1200", "960");
        assert_eq!(deltas_between(&today, None), MetricDeltas::default());

        let zero = metric("2026-05-19", "0", "0");
        assert_eq!(deltas_between(&today, Some(&zero)), MetricDeltas::default());
    }
}
