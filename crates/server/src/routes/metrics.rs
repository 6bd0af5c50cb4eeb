//! Daily metric route handlers.

use axum::{Json, extract::State};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_core::MetricId;

use crate::error::Result;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::RequireUser;
use crate::models::{DailyMetric, MetricDeltas};
use crate::services::{MetricInput, MetricService, MetricWindow};
use crate::state::AppState;

/// Body of `POST /v1/metrics`.
#[derive(Debug, Deserialize)]
pub struct MetricRequest {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub cash: Decimal,
    pub source: Option<String>,
}

/// Query of `GET /v1/metrics`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Trailing window such as `10d`.
    pub range: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Query of `GET /v1/insights`.
#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub date: Option<NaiveDate>,
}

/// A stored metric as sent to clients.
#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub id: MetricId,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub sales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash: Decimal,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deltas: Option<DeltasResponse>,
}

/// Percentage change against the previous day.
#[derive(Debug, Serialize)]
pub struct DeltasResponse {
    pub sales: f64,
    pub cash: f64,
}

/// Body of `GET /v1/metrics`.
#[derive(Debug, Serialize)]
pub struct MetricListResponse {
    pub metrics: Vec<MetricResponse>,
}

/// Body of `GET /v1/insights`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub pct_sales: f64,
    pub pct_cash: f64,
}

impl MetricResponse {
    fn new(metric: DailyMetric, deltas: Option<MetricDeltas>) -> Self {
        Self {
            id: metric.id,
            date: metric.date,
            sales: metric.sales,
            cash: metric.cash,
            source: metric.source.as_str().to_owned(),
            deltas: deltas.map(|d| DeltasResponse {
                sales: d.sales,
                cash: d.cash,
            }),
        }
    }
}

/// POST /v1/metrics
///
/// Creates the day's entry or overwrites the existing one.
pub async fn upsert_metric(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<MetricRequest>,
) -> Result<Json<MetricResponse>> {
    let stored = MetricService::new(state.pool())
        .upsert(
            user.id,
            MetricInput {
                date: body.date,
                sales: body.sales,
                cash: body.cash,
                source: body.source.as_deref(),
            },
        )
        .await?;

    Ok(Json(MetricResponse::new(stored.metric, Some(stored.deltas))))
}

/// GET /v1/metrics
pub async fn list_metrics(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<MetricListResponse>> {
    let window = MetricWindow {
        range: query.range.as_deref(),
        start: query.start,
        end: query.end,
    };

    let metrics = MetricService::new(state.pool())
        .list(user.id, &window, state.clock().today())
        .await?;

    Ok(Json(MetricListResponse {
        metrics: metrics
            .into_iter()
            .map(|m| MetricResponse::new(m, None))
            .collect(),
    }))
}

/// GET /v1/insights
///
/// Defaults to today when no date is given.
pub async fn insights(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiQuery(query): ApiQuery<InsightsQuery>,
) -> Result<Json<InsightsResponse>> {
    let date = query.date.unwrap_or_else(|| state.clock().today());
    let deltas = MetricService::new(state.pool()).insights(user.id, date).await?;

    Ok(Json(InsightsResponse {
        pct_sales: deltas.sales,
        pct_cash: deltas.cash,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use tallybook_core::{MetricSource, UserId};

    use super::*;

    #[test]
    fn test_metric_response_shape() {
        let metric = DailyMetric {
            id: MetricId::new(7),
            user_id: UserId::new(1),
            date: "2026-03-10".parse().unwrap(),
            sales: "1200.50".parse().unwrap(),
            cash: "300".parse().unwrap(),
            source: MetricSource::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let with = serde_json::to_value(MetricResponse::new(
            metric.clone(),
            Some(MetricDeltas {
                sales: 20.0,
                cash: -5.0,
            }),
        ))
        .unwrap();
        assert_eq!(with["id"], 7);
        assert_eq!(with["date"], "2026-03-10");
        assert_eq!(with["sales"], 1200.5);
        assert_eq!(with["source"], "APP");
        assert_eq!(with["deltas"]["sales"], 20.0);

        let without = serde_json::to_value(MetricResponse::new(metric, None)).unwrap();
        assert!(without.get("deltas").is_none());
    }

    #[test]
    fn test_insights_keys() {
        let json = serde_json::to_value(InsightsResponse {
            pct_sales: 20.0,
            pct_cash: 0.0,
        })
        .unwrap();
        assert_eq!(json["pctSales"], 20.0);
        assert_eq!(json["pctCash"], 0.0);
    }
}
