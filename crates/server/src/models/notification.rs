//! Notification domain types.

use chrono::{DateTime, Utc};

use tallybook_core::{NotificationId, NotificationKind, UserId};

/// A stored notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification produced by rule evaluation, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}
