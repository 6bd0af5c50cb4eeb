//! Domain models for Tallybook.
//!
//! These types represent validated domain objects separate from database row types.

pub mod metric;
pub mod notification;
pub mod user;

pub use metric::{DailyMetric, MetricDeltas};
pub use notification::{NewNotification, Notification};
pub use user::User;
