//! End-to-end tests for the Tallybook API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the server against a scratch database
//! cargo run -p tallybook-cli -- migrate
//! TALLYBOOK_AUTH_RATE_LIMIT=false cargo run -p tallybook-server
//!
//! # Run the ignored end-to-end tests
//! cargo test -p tallybook-integration-tests -- --ignored
//! ```
//!
//! `TALLYBOOK_BASE_URL` points the tests at another server (default
//! `http://localhost:8000`). Every test registers its own throwaway account,
//! so they can run in any order against a shared database. The login rate
//! limiter must be off, since the suite registers far more than five accounts.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API.
#[must_use]
pub fn base_url() -> String {
    std::env::var("TALLYBOOK_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A registered account and its tokens.
pub struct TestUser {
    pub client: Client,
    pub email: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    /// Register a fresh account with a unique email.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or registration fails.
    pub async fn register() -> Self {
        let client = Client::new();
        let email = format!("it-{}@tallybook.test", Uuid::new_v4().simple());
        let password = "integration-pass-42".to_string();

        let resp = client
            .post(format!("{}/register", base_url()))
            .json(&json!({ "email": email, "password": password, "name": "Integration" }))
            .send()
            .await
            .expect("Failed to register test user");
        assert_eq!(resp.status(), StatusCode::OK, "registration failed");

        let tokens: Value = resp.json().await.expect("Invalid token response");
        Self {
            client,
            email,
            password,
            access_token: token_field(&tokens, "access_token"),
            refresh_token: token_field(&tokens, "refresh_token"),
        }
    }

    /// Authenticated GET returning status and JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", base_url()))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .expect("GET failed");
        into_parts(resp).await
    }

    /// Authenticated POST with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", base_url()))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .expect("POST failed");
        into_parts(resp).await
    }

    /// Authenticated PUT with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn put(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .put(format!("{}{path}", base_url()))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .expect("PUT failed");
        into_parts(resp).await
    }
}

fn token_field(tokens: &Value, key: &str) -> String {
    tokens
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Status plus JSON body (or `Null` for a non-JSON body).
pub async fn into_parts(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}
