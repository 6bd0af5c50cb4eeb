//! Rule-based notifications.
//!
//! Rules look at the trailing week of metrics whenever the user opens their
//! notification list. Every generated message embeds today's ISO date, which is
//! what makes generation idempotent within a day.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tallybook_core::{NotificationId, NotificationKind, UserId};

use crate::db::{MetricRepository, NotificationRepository, RepositoryError};
use crate::models::{DailyMetric, NewNotification, Notification};

/// Title of the "today's figures were saved" notification.
pub const ENTRY_RECORDED_TITLE: &str = "Saisie enregistrée";

/// Title of the high sales notification.
pub const HIGH_SALES_TITLE: &str = "Ventes en hausse";

/// Title of the low cash notification.
pub const LOW_CASH_TITLE: &str = "Trésorerie en baisse";

/// Days looked at by the rules, today included.
const RULE_WINDOW_DAYS: u64 = 7;

/// Yesterday's sales above `average * 1.2` count as high.
const HIGH_SALES_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// Yesterday's cash below `average * 0.8` counts as low.
const LOW_CASH_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Notification service.
pub struct NotificationService<'a> {
    notifications: NotificationRepository<'a>,
    metrics: MetricRepository<'a>,
}

impl<'a> NotificationService<'a> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            notifications: NotificationRepository::new(pool),
            metrics: MetricRepository::new(pool),
        }
    }

    /// Evaluate the rules for `today` and store whatever they produce.
    ///
    /// Running this more than once on the same day creates no duplicates.
    /// Returns the number of notifications created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database fails.
    pub async fn generate_dynamic(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<usize, RepositoryError> {
        let today_tag = today.to_string();
        let start = today
            .checked_sub_days(Days::new(RULE_WINDOW_DAYS - 1))
            .unwrap_or(NaiveDate::MIN);
        let window = self.metrics.list_between(user_id, start, today).await?;

        let mut tx = self.notifications.begin_generation(user_id).await?;
        let mut created = Vec::new();

        if !NotificationRepository::message_mentions(&mut tx, user_id, &today_tag).await? {
            created.extend(trend_notifications(&window, today));
        }

        if window.iter().any(|m| m.date == today)
            && !NotificationRepository::exists_with_title(
                &mut tx,
                user_id,
                ENTRY_RECORDED_TITLE,
                &today_tag,
            )
            .await?
        {
            created.push(entry_recorded_notification(today));
        }

        NotificationRepository::insert_many(&mut tx, user_id, &created).await?;
        tx.commit().await?;

        if !created.is_empty() {
            tracing::debug!(user_id = %user_id, count = created.len(), "Generated notifications");
        }
        Ok(created.len())
    }

    /// Generate today's notifications, then return the most recent ones, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database fails.
    pub async fn list(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<Vec<Notification>, RepositoryError> {
        self.generate_dynamic(user_id, today).await?;
        self.notifications.list_recent(user_id).await
    }

    /// Mark one notification as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist or is not the user's.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<Notification, RepositoryError> {
        self.notifications.mark_read(user_id, id).await
    }

    /// Mark all of the user's notifications as read. Returns the number updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.notifications.mark_all_read(user_id).await
    }
}

/// Sales/cash trend notifications for `today`.
///
/// Compares yesterday against the average of the rows present in
/// `[today-6, today]`. Produces nothing without a row for yesterday.
#[must_use]
pub fn trend_notifications(window: &[DailyMetric], today: NaiveDate) -> Vec<NewNotification> {
    let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
        return Vec::new();
    };
    let Some(last) = window.iter().find(|m| m.date == yesterday) else {
        return Vec::new();
    };

    let count = Decimal::from(window.len());
    let avg_sales = window.iter().map(|m| m.sales).sum::<Decimal>() / count;
    let avg_cash = window.iter().map(|m| m.cash).sum::<Decimal>() / count;

    let mut out = Vec::new();

    if last.sales > avg_sales * HIGH_SALES_FACTOR {
        out.push(NewNotification {
            title: HIGH_SALES_TITLE.to_owned(),
            message: format!(
                "Les ventes d'hier ({} €) dépassent de plus de 20 % la moyenne sur 7 jours ({} €). ({today})",
                last.sales.round_dp(2),
                avg_sales.round_dp(2),
            ),
            kind: NotificationKind::Success,
        });
    }

    if last.cash < avg_cash * LOW_CASH_FACTOR {
        out.push(NewNotification {
            title: LOW_CASH_TITLE.to_owned(),
            message: format!(
                "La trésorerie d'hier ({} €) est inférieure de plus de 20 % à la moyenne sur 7 jours ({} €). ({today})",
                last.cash.round_dp(2),
                avg_cash.round_dp(2),
            ),
            kind: NotificationKind::Warning,
        });
    }

    out
}

/// Acknowledgement that today's figures were entered.
#[must_use]
pub fn entry_recorded_notification(today: NaiveDate) -> NewNotification {
    NewNotification {
        title: ENTRY_RECORDED_TITLE.to_owned(),
        message: format!("Tes chiffres du jour sont bien enregistrés. ({today})"),
        kind: NotificationKind::Info,
    }
}
