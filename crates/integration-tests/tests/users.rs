//! End-to-end tests for the profile endpoints.
//!
//! Requires a migrated database and a running server.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;
use tallybook_integration_tests::TestUser;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_me_returns_profile() {
    let user = TestUser::register().await;

    let (status, body) = user.get("/user/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], user.email.as_str());
    assert_eq!(body["name"], "Integration");
    assert_eq!(body["locale"], "FR");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_update_name_and_locale() {
    let user = TestUser::register().await;

    let (status, body) = user
        .put("/user/me", &json!({ "name": "  Awa  ", "locale": "EN" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Awa");
    assert_eq!(body["locale"], "EN");
    assert_eq!(body["email"], user.email.as_str());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_update_to_taken_email() {
    let first = TestUser::register().await;
    let second = TestUser::register().await;

    let (status, body) = second
        .put("/user/me", &json!({ "email": first.email }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already in use");
}
