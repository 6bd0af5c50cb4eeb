//! Notification route handlers.
//!
//! Listing evaluates the day's rules first, so the feed is always current
//! without a background job.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tallybook_core::{NotificationId, NotificationKind};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::middleware::RequireUser;
use crate::models::Notification;
use crate::routes::auth::MessageResponse;
use crate::services::NotificationService;
use crate::state::AppState;

/// A notification as sent to clients.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            kind: n.kind,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<NotificationResponse>>> {
    let notifications = NotificationService::new(state.pool())
        .list(user.id, state.clock().today())
        .await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// PUT /notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<NotificationResponse>> {
    let notification = NotificationService::new(state.pool())
        .mark_read(user.id, id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Notification not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(Json(notification.into()))
}

/// PUT /notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<MessageResponse>> {
    let count = NotificationService::new(state.pool())
        .mark_all_read(user.id)
        .await?;

    tracing::debug!(user_id = %user.id, count, "Notifications marked read");
    Ok(Json(MessageResponse {
        message: format!("{count} notifications marquées comme lues"),
    }))
}
