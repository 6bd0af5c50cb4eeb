//! End-to-end tests for registration, login and token refresh.
//!
//! Requires a migrated database and a running server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tallybook_integration_tests::{TestUser, base_url, into_parts};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_register_then_login() {
    let user = TestUser::register().await;
    assert!(!user.access_token.is_empty());
    assert!(!user.refresh_token.is_empty());

    let (status, body) = into_parts(
        Client::new()
            .post(format!("{}/login", base_url()))
            .json(&json!({ "email": user.email, "password": user.password }))
            .send()
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_duplicate_email_rejected() {
    let user = TestUser::register().await;

    let (status, body) = into_parts(
        Client::new()
            .post(format!("{}/register", base_url()))
            .json(&json!({ "email": user.email, "password": "another-pass-9", "name": "Twin" }))
            .send()
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_wrong_password_is_unauthorized() {
    let user = TestUser::register().await;

    let (status, body) = into_parts(
        Client::new()
            .post(format!("{}/login", base_url()))
            .json(&json!({ "email": user.email, "password": "not-the-password" }))
            .send()
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_refresh_issues_working_tokens() {
    let user = TestUser::register().await;

    let (status, body) = into_parts(
        Client::new()
            .post(format!("{}/refresh", base_url()))
            .bearer_auth(&user.refresh_token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fresh = body["access_token"].as_str().unwrap();
    let resp = Client::new()
        .get(format!("{}/user/me", base_url()))
        .bearer_auth(fresh)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_refresh_with_garbage_token() {
    let (status, body) = into_parts(
        Client::new()
            .post(format!("{}/refresh", base_url()))
            .bearer_auth("garbage")
            .send()
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid refresh token");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_set_fcm_token() {
    let user = TestUser::register().await;

    let (status, body) = user
        .post("/set-fcm-token", &json!({ "fcm_token": "device-abc" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "FCM token updated");

    let (status, _) = user.post("/set-fcm-token", &json!({ "fcm_token": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_missing_token_is_unauthorized() {
    let resp = Client::new()
        .get(format!("{}/v1/dashboard", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid token");
}
