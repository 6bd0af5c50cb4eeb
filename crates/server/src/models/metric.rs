//! Daily metric domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use tallybook_core::{MetricId, MetricSource, UserId};

/// A user's sales and cash figures for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyMetric {
    pub id: MetricId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub sales: Decimal,
    pub cash: Decimal,
    pub source: MetricSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Day-over-day percentage change for sales and cash.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricDeltas {
    pub sales: f64,
    pub cash: f64,
}
