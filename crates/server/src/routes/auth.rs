//! Authentication route handlers.
//!
//! Registration and login hand back an access/refresh token pair. `/refresh`
//! trades any still-valid token for a fresh pair.

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{RequireUser, bearer_token};
use crate::services::{AuthError, AuthService, TokenPair, UserService};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Push token registration payload.
#[derive(Debug, Deserialize)]
pub struct FcmTokenRequest {
    pub fcm_token: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<TokenPair>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth.register(&body.email, &body.password, &body.name).await?;
    Ok(Json(auth.issue_tokens(&user)?))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth
        .authenticate(&body.email, &body.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(auth.issue_tokens(&user)?))
}

/// POST /refresh
///
/// Expects the refresh token as a bearer credential.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<TokenPair>> {
    let token = bearer_token(&headers).ok_or_else(invalid_refresh_token)?;

    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth
        .resolve_user(token)
        .await?
        .ok_or_else(invalid_refresh_token)?;

    set_sentry_user(&user.id);
    Ok(Json(auth.issue_tokens(&user)?))
}

/// POST /set-fcm-token
pub async fn set_fcm_token(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<FcmTokenRequest>,
) -> Result<Json<MessageResponse>> {
    UserService::new(state.pool())
        .set_push_token(&user, &body.fcm_token)
        .await?;

    Ok(Json(MessageResponse {
        message: "FCM token updated".to_owned(),
    }))
}

fn invalid_refresh_token() -> AppError {
    AppError::Unauthorized("Invalid refresh token".to_owned())
}
