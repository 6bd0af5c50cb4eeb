//! End-to-end tests for metric upsert, listing and insights.
//!
//! Requires a migrated database and a running server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Days, Local};
use reqwest::StatusCode;
use serde_json::json;
use tallybook_integration_tests::TestUser;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_second_submission_overwrites() {
    let user = TestUser::register().await;

    let (status, first) = user
        .post(
            "/v1/metrics",
            &json!({ "date": "2026-02-10", "sales": 500, "cash": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["source"], "APP");

    let (status, second) = user
        .post(
            "/v1/metrics",
            &json!({ "date": "2026-02-10", "sales": 750.5, "cash": 80, "source": "import" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["sales"], 750.5);
    assert_eq!(second["source"], "IMPORT");

    let (_, list) = user
        .get("/v1/metrics?start=2026-02-01&end=2026-02-28")
        .await;
    let metrics = list["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0]["cash"], 80.0);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_deltas_and_insights() {
    let user = TestUser::register().await;

    user.post(
        "/v1/metrics",
        &json!({ "date": "2026-01-14", "sales": 1000, "cash": 0 }),
    )
    .await;
    let (_, stored) = user
        .post(
            "/v1/metrics",
            &json!({ "date": "2026-01-15", "sales": 1200, "cash": 50 }),
        )
        .await;

    let pct = stored["deltas"]["sales"].as_f64().unwrap();
    assert!((pct - 20.0).abs() < 0.01);
    assert_eq!(stored["deltas"]["cash"], 0.0);

    let (status, insights) = user.get("/v1/insights?date=2026-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert!((insights["pctSales"].as_f64().unwrap() - 20.0).abs() < 0.01);
    assert_eq!(insights["pctCash"], 0.0);

    let (_, missing) = user.get("/v1/insights?date=2025-06-01").await;
    assert_eq!(missing["pctSales"], 0.0);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_list_is_newest_first_within_range() {
    let user = TestUser::register().await;
    let today = Local::now().date_naive();

    for back in [0_u64, 3, 12] {
        let date = today.checked_sub_days(Days::new(back)).unwrap();
        user.post(
            "/v1/metrics",
            &json!({ "date": date.to_string(), "sales": 10, "cash": 5 }),
        )
        .await;
    }

    let (status, body) = user.get("/v1/metrics?range=10d").await;
    assert_eq!(status, StatusCode::OK);

    let dates: Vec<&str> = body["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates.len(), 2);
    assert!(dates[0] > dates[1]);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_invalid_input_is_rejected() {
    let user = TestUser::register().await;

    let (status, _) = user
        .post(
            "/v1/metrics",
            &json!({ "date": "2026-02-10", "sales": -1, "cash": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = user.get("/v1/metrics?range=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = user.get("/v1/metrics?start=2026-02-10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_amount_beyond_column_is_rejected() {
    let user = TestUser::register().await;

    let (status, body) = user
        .post(
            "/v1/metrics",
            &json!({ "date": "2026-03-01", "sales": 1e13, "cash": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("sales"));

    let (_, list) = user
        .get("/v1/metrics?start=2026-03-01&end=2026-03-01")
        .await;
    assert!(list["metrics"].as_array().unwrap().is_empty());
}
