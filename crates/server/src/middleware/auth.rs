//! Bearer token authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with `401 {"detail": "Invalid token"}` when the header is missing,
/// the token does not verify, or its subject no longer exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> String {
///     format!("Bonjour, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(invalid_token)?;

        let user = AuthService::new(state.pool(), state.tokens())
            .resolve_user(token)
            .await?
            .ok_or_else(invalid_token)?;

        set_sentry_user(&user.id);
        Ok(Self(user))
    }
}

fn invalid_token() -> AppError {
    AppError::Unauthorized("Invalid token".to_owned())
}

/// The token from an `Authorization: Bearer <token>` header, if well formed.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
