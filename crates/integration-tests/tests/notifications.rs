//! End-to-end tests for the notification feed.
//!
//! Requires a migrated database and a running server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Local;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tallybook_integration_tests::TestUser;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_listing_twice_creates_no_duplicates() {
    let user = TestUser::register().await;
    let today = Local::now().date_naive();

    user.post(
        "/v1/metrics",
        &json!({ "date": today.to_string(), "sales": 100, "cash": 40 }),
    )
    .await;

    let (status, first) = user.get("/notifications").await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = user.get("/notifications").await;

    let first = first.as_array().unwrap();
    assert_eq!(first.len(), second.as_array().unwrap().len());
    assert!(
        first
            .iter()
            .any(|n| n["title"] == "Saisie enregistrée" && n["type"] == "info")
    );
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_mark_read_and_read_all() {
    let user = TestUser::register().await;
    let today = Local::now().date_naive();

    user.post(
        "/v1/metrics",
        &json!({ "date": today.to_string(), "sales": 100, "cash": 40 }),
    )
    .await;
    let (_, feed) = user.get("/notifications").await;
    let id = feed[0]["id"].as_i64().unwrap();

    let (status, body) = user
        .put(&format!("/notifications/{id}/read"), &Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    let (status, body) = user.put("/notifications/read-all", &Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .ends_with("notifications marquées comme lues")
    );

    let (_, feed) = user.get("/notifications").await;
    assert!(feed.as_array().unwrap().iter().all(|n| n["is_read"] == true));
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_foreign_notification_is_not_found() {
    let owner = TestUser::register().await;
    let other = TestUser::register().await;
    let today = Local::now().date_naive();

    owner
        .post(
            "/v1/metrics",
            &json!({ "date": today.to_string(), "sales": 1, "cash": 1 }),
        )
        .await;
    let (_, feed) = owner.get("/notifications").await;
    let id = feed[0]["id"].as_i64().unwrap();

    let (status, body) = other
        .put(&format!("/notifications/{id}/read"), &Value::Null)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Notification not found");
}
