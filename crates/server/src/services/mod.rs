//! Business logic services.
//!
//! Each service borrows the connection pool for the duration of a request and
//! owns the repositories it needs. The reminder service is the exception: it
//! owns a pool handle because it outlives any request.

pub mod auth;
pub mod dashboard;
pub mod metrics;
pub mod notifications;
pub mod push;
pub mod reminders;
pub mod users;

pub use auth::{AuthError, AuthService, TokenIssuer, TokenPair};
pub use dashboard::{DashboardService, DashboardStats, GraphData};
pub use metrics::{MetricError, MetricInput, MetricService, MetricWindow, MetricWithDeltas};
pub use notifications::NotificationService;
pub use push::{
    HttpPushGateway, LogPushGateway, PushError, PushGateway, PushMessage, gateway_from_config,
};
pub use reminders::{ReminderHandle, ReminderService, ReminderSweep};
pub use users::{ProfileUpdate, UserError, UserService};
