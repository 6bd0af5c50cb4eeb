//! End-to-end tests for the dashboard and graph views.
//!
//! Requires a migrated database and a running server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Days, Local};
use reqwest::StatusCode;
use serde_json::json;
use tallybook_integration_tests::TestUser;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_empty_dashboard_is_all_zero() {
    let user = TestUser::register().await;

    let (status, body) = user.get("/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userName"], "Integration");
    assert_eq!(body["yesterdaySales"], 0.0);
    assert_eq!(body["yesterdayCash"], 0.0);

    let sales = body["salesData"].as_array().unwrap();
    assert_eq!(sales.len(), 7);
    assert!(sales.iter().all(|v| v.as_f64() == Some(0.0)));
    assert_eq!(body["cashData"].as_array().unwrap().len(), 7);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_dashboard_reflects_yesterday() {
    let user = TestUser::register().await;
    let yesterday = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();

    user.post(
        "/v1/metrics",
        &json!({ "date": yesterday.to_string(), "sales": 321.5, "cash": 12 }),
    )
    .await;

    let (_, body) = user.get("/v1/dashboard").await;
    assert_eq!(body["yesterdaySales"], 321.5);
    assert_eq!(body["yesterdayCash"], 12.0);
    assert_eq!(body["salesData"][5], 321.5);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_graph_weeks_sum_to_total() {
    let user = TestUser::register().await;
    let today = Local::now().date_naive();

    for back in [0_u64, 6, 9, 17, 25] {
        let date = today.checked_sub_days(Days::new(back)).unwrap();
        user.post(
            "/v1/metrics",
            &json!({ "date": date.to_string(), "sales": 100, "cash": 10 }),
        )
        .await;
    }

    let (status, body) = user.get("/v1/graphs").await;
    assert_eq!(status, StatusCode::OK);

    let weekly: f64 = body["weeklySales"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .sum();
    assert_eq!(body["weeklySales"].as_array().unwrap().len(), 3);
    assert!((weekly - body["totalSales"].as_f64().unwrap()).abs() < f64::EPSILON);
    assert_eq!(body["totalSales"], 400.0);
}
