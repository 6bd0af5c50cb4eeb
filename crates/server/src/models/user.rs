//! User domain types.

use chrono::{DateTime, Utc};

use tallybook_core::{Email, UserId};

/// Locale assigned to new accounts.
pub const DEFAULT_LOCALE: &str = "FR";

/// A registered business owner (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (also the token subject).
    pub email: Email,
    /// Display name shown on the dashboard.
    pub name: String,
    /// Preferred locale, e.g. `FR`.
    pub locale: String,
    /// Push notification token registered by the mobile app.
    pub fcm_token: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
