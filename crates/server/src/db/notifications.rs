//! Notification repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use tallybook_core::{NotificationId, NotificationKind, UserId};

use super::RepositoryError;
use crate::models::{NewNotification, Notification};

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, kind, is_read, created_at";

/// Maximum number of notifications returned by [`NotificationRepository::list_recent`].
pub const LIST_LIMIT: i64 = 100;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i32,
    user_id: i32,
    title: String,
    message: String,
    kind: NotificationKind,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            message: row.message,
            kind: row.kind,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction holding the user's notification-generation lock.
    ///
    /// The advisory lock is released when the transaction ends, so concurrent
    /// generators for one user run their check-then-insert one at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction cannot be opened.
    pub async fn begin_generation(
        &self,
        user_id: UserId,
    ) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1::bigint)")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    /// Persist a batch of generated notifications on `conn`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn insert_many(
        conn: &mut PgConnection,
        user_id: UserId,
        notifications: &[NewNotification],
    ) -> Result<(), RepositoryError> {
        for n in notifications {
            sqlx::query(
                "INSERT INTO notifications (user_id, title, message, kind) VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(&n.title)
            .bind(&n.message)
            .bind(n.kind)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Whether any notification message for the user contains `needle`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn message_mentions(
        conn: &mut PgConnection,
        user_id: UserId,
        needle: &str,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND strpos(message, $2) > 0
            )
            ",
        )
        .bind(user_id)
        .bind(needle)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Whether a notification with `title` whose message contains `needle` exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_with_title(
        conn: &mut PgConnection,
        user_id: UserId,
        title: &str,
        needle: &str,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND title = $2 AND strpos(message, $3) > 0
            )
            ",
        )
        .bind(user_id)
        .bind(title)
        .bind(needle)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// The user's most recent notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(user_id)
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark one of the user's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist
    /// or belongs to another user.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Mark every unread notification of the user as read. Returns the count updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
                .bind(user_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
