//! HTTP route handlers for the Tallybook API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Liveness message
//! GET  /health                    - Health check
//! GET  /health/ready              - Database readiness
//!
//! # Auth (login/register are rate limited)
//! POST /register                  - Create account, returns tokens
//! POST /login                     - Check credentials, returns tokens
//! POST /refresh                   - Trade a valid token for a new pair
//! POST /set-fcm-token             - Register the device push token
//!
//! # Metrics (bearer)
//! POST /v1/metrics                - Create or overwrite a day's figures
//! GET  /v1/metrics                - List by ?range=10d or ?start=&end=
//! GET  /v1/insights               - Day-over-day change for ?date=
//! GET  /v1/dashboard              - Yesterday + trailing 7 days
//! GET  /v1/graphs                 - Weekly totals, last 3 weeks
//!
//! # Notifications (bearer)
//! GET  /notifications             - Evaluate today's rules, list newest first
//! PUT  /notifications/{id}/read   - Mark one read
//! PUT  /notifications/read-all    - Mark all read
//!
//! # Profile (bearer)
//! GET  /user/me                   - Current account
//! PUT  /user/me                   - Update name, email, password or locale
//! ```

pub mod auth;
pub mod dashboard;
pub mod metrics;
pub mod notifications;
pub mod users;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Credential endpoints, optionally behind the per-IP rate limiter.
pub fn credential_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    if rate_limited {
        router.route_layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Token endpoints that already require a bearer token.
pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/refresh", post(auth::refresh))
        .route("/set-fcm-token", post(auth::set_fcm_token))
}

/// Versioned metric, dashboard and graph routes.
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/metrics",
            get(metrics::list_metrics).post(metrics::upsert_metric),
        )
        .route("/insights", get(metrics::insights))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/graphs", get(dashboard::graphs))
}

/// Notification routes.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Profile routes.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/me", get(users::me).put(users::update_me))
}

/// Create the main router with all routes.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(credential_routes(rate_limited))
        .merge(token_routes())
        .nest("/v1", v1_routes())
        .nest("/notifications", notification_routes())
        .nest("/user", user_routes())
}

/// GET /
async fn root() -> Json<Value> {
    Json(json!({ "message": "Tallybook API is running" }))
}

/// Liveness health check. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
