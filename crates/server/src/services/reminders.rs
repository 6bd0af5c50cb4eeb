//! Daily entry reminders.
//!
//! Once a day at a fixed local time, every user who registered a push token
//! and has not entered today's figures gets a reminder through the push
//! gateway. The schedule runs on its own tokio task and is stopped through a
//! [`CancellationToken`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDateTime, NaiveTime};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::db::{RepositoryError, UserRepository};
use crate::models::User;
use crate::services::push::{PushGateway, PushMessage};

/// Reminder title.
pub const REMINDER_TITLE: &str = "Rappel";

/// Reminder body.
pub const REMINDER_BODY: &str = "Pense à saisir tes chiffres du jour 👍";

/// Outcome of one reminder sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSweep {
    /// Users without an entry for today who hold a push token.
    pub candidates: usize,
    /// Reminders accepted by the gateway.
    pub sent: usize,
    /// Reminders the gateway rejected.
    pub failed: usize,
}

/// Sends the daily reminder.
pub struct ReminderService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
    gateway: Arc<dyn PushGateway>,
    fire_at: NaiveTime,
}

impl ReminderService {
    /// Create a reminder service firing daily at `fire_at` local time.
    #[must_use]
    pub fn new(
        pool: PgPool,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn PushGateway>,
        fire_at: NaiveTime,
    ) -> Self {
        Self {
            pool,
            clock,
            gateway,
            fire_at,
        }
    }

    /// Run a single sweep for the clock's current date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the candidate query fails. Individual
    /// delivery failures are counted, not returned.
    pub async fn run_once(&self) -> Result<ReminderSweep, RepositoryError> {
        let today = self.clock.today();
        let users = UserRepository::new(&self.pool)
            .list_missing_entry_with_token(today)
            .await?;

        let sweep = deliver(self.gateway.as_ref(), &users).await;
        tracing::info!(
            date = %today,
            candidates = sweep.candidates,
            sent = sweep.sent,
            failed = sweep.failed,
            "Reminder sweep finished"
        );
        Ok(sweep)
    }

    /// Spawn the daily schedule.
    #[must_use]
    pub fn start(self: Arc<Self>) -> ReminderHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_schedule(self, cancel.clone()));
        tracing::info!("Reminder scheduler started");
        ReminderHandle { cancel, task }
    }

    fn until_next_fire(&self) -> Duration {
        let now = self.clock.now();
        let next = next_fire_after(now, self.fire_at);
        (next - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Running schedule. Dropping the handle leaves the task running; call [`ReminderHandle::stop`].
pub struct ReminderHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    /// Cancel the schedule and wait for the task to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Reminder scheduler task ended abnormally");
        }
    }
}

async fn run_schedule(service: Arc<ReminderService>, cancel: CancellationToken) {
    loop {
        let wait = service.until_next_fire();
        tracing::debug!(seconds = wait.as_secs(), "Next reminder sweep scheduled");

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("Reminder scheduler shutting down");
                break;
            }
            () = tokio::time::sleep(wait) => {
                if let Err(e) = service.run_once().await {
                    tracing::error!(error = %e, "Reminder sweep failed");
                }
            }
        }
    }
}

/// Send one reminder per user, continuing past individual failures.
pub async fn deliver(gateway: &dyn PushGateway, users: &[User]) -> ReminderSweep {
    let mut sweep = ReminderSweep::default();

    for user in users {
        let Some(token) = user.fcm_token.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        sweep.candidates += 1;

        let message = PushMessage {
            token: token.to_owned(),
            title: REMINDER_TITLE.to_owned(),
            body: REMINDER_BODY.to_owned(),
        };

        match gateway.send(&message).await {
            Ok(()) => sweep.sent += 1,
            Err(e) => {
                sweep.failed += 1;
                tracing::warn!(user_id = %user.id, error = %e, "Failed to send reminder");
            }
        }
    }

    sweep
}

/// First instant strictly after `now` whose time of day is `at`.
#[must_use]
pub fn next_fire_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        return today;
    }
    now.date()
        .checked_add_days(Days::new(1))
        .map_or(today, |tomorrow| tomorrow.and_time(at))
}
