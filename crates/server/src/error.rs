//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Error bodies are `{"detail": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, MetricError, UserError};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Metric operation failed.
    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    /// Profile operation failed.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// Missing, malformed or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unique key already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found or not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => auth_status(err),
            Self::Metric(err) => match err {
                MetricError::Repository(inner) => repository_status(inner),
                _ => StatusCode::BAD_REQUEST,
            },
            Self::User(err) => match err {
                UserError::NotFound => StatusCode::NOT_FOUND,
                UserError::EmailTaken | UserError::InvalidEmail(_) | UserError::Invalid(_) => {
                    StatusCode::BAD_REQUEST
                }
                UserError::Auth(inner) => auth_status(inner),
                UserError::Repository(inner) => repository_status(inner),
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return INTERNAL_MESSAGE.to_owned();
        }

        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Auth(err) | Self::User(UserError::Auth(err)) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::UserAlreadyExists => "Email already registered".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => format!("Invalid email address: {e}"),
                other => other.to_string(),
            },
            Self::Metric(err) => err.to_string(),
            Self::User(err) => err.to_string(),
            Self::Unauthorized(msg)
            | Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Database(_) => INTERNAL_MESSAGE.to_owned(),
        }
    }
}

const fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::UserAlreadyExists
        | AuthError::WeakPassword(_)
        | AuthError::InvalidEmail(_)
        | AuthError::EmptyName => StatusCode::BAD_REQUEST,
        AuthError::Repository(_) | AuthError::Token(_) | AuthError::PasswordHash => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        // Don't expose internal error details to clients
        let body = Json(json!({ "detail": self.public_message() }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("notification 9".to_string());
        assert_eq!(err.to_string(), "Not found: notification 9");

        let err = AppError::Validation("invalid input".to_string());
        assert_eq!(err.to_string(), "Validation error: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(MetricError::InvertedWindow.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(MetricError::ValueTooLarge("sales").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(MetricError::TooPrecise("cash").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(UserError::EmailTaken.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(MetricError::Repository(RepositoryError::DataCorruption("x".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response =
            AppError::Database(RepositoryError::DataCorruption("secret table".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_email_taken_detail() {
        let response = AppError::from(UserError::EmailTaken).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Email already in use");
    }
}
