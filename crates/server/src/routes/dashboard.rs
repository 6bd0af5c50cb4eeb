//! Dashboard and graph route handlers.

use axum::{Json, extract::State};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::{DashboardService, DashboardStats, GraphData};
use crate::state::AppState;

/// Body of `GET /v1/dashboard`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user_name: String,
    pub yesterday_sales: f64,
    pub yesterday_cash: f64,
    pub sales_data: Vec<f64>,
    pub cash_data: Vec<f64>,
}

/// Body of `GET /v1/graphs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphsResponse {
    pub weekly_sales: Vec<f64>,
    pub weekly_cash: Vec<f64>,
    pub total_sales: f64,
    pub total_cash: f64,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            user_name: stats.user_name,
            yesterday_sales: to_f64(stats.yesterday_sales),
            yesterday_cash: to_f64(stats.yesterday_cash),
            sales_data: series(&stats.sales_data),
            cash_data: series(&stats.cash_data),
        }
    }
}

impl From<GraphData> for GraphsResponse {
    fn from(data: GraphData) -> Self {
        Self {
            weekly_sales: series(&data.weekly_sales),
            weekly_cash: series(&data.weekly_cash),
            total_sales: to_f64(data.total_sales),
            total_cash: to_f64(data.total_cash),
        }
    }
}

/// GET /v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<DashboardResponse>> {
    let stats = DashboardService::new(state.pool())
        .stats(user.id, &user.name, state.clock().today())
        .await?;
    Ok(Json(stats.into()))
}

/// GET /v1/graphs
pub async fn graphs(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<GraphsResponse>> {
    let data = DashboardService::new(state.pool())
        .graphs(user.id, state.clock().today())
        .await?;
    Ok(Json(data.into()))
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn series(values: &[Decimal]) -> Vec<f64> {
    values.iter().copied().map(to_f64).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_keys_are_camel_case() {
        let stats = DashboardStats {
            user_name: "Awa".to_owned(),
            yesterday_sales: Decimal::new(15_050, 2),
            yesterday_cash: Decimal::ZERO,
            sales_data: vec![Decimal::ZERO; 7],
            cash_data: vec![Decimal::ONE; 7],
        };

        let json = serde_json::to_value(DashboardResponse::from(stats)).unwrap();
        assert_eq!(json["userName"], "Awa");
        assert_eq!(json["yesterdaySales"], 150.5);
        assert_eq!(json["salesData"].as_array().unwrap().len(), 7);
        assert_eq!(json["cashData"][6], 1.0);
    }

    #[test]
    fn test_graphs_keys_are_camel_case() {
        let data = GraphData {
            weekly_sales: vec![Decimal::ONE, Decimal::TWO, Decimal::TEN],
            weekly_cash: vec![Decimal::ZERO; 3],
            total_sales: Decimal::new(13, 0),
            total_cash: Decimal::ZERO,
        };

        let json = serde_json::to_value(GraphsResponse::from(data)).unwrap();
        assert_eq!(json["weeklySales"][2], 10.0);
        assert_eq!(json["totalSales"], 13.0);
        assert_eq!(json["totalCash"], 0.0);
    }
}
