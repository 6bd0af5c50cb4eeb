//! Core types for Tallybook.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod change;
pub mod email;
pub mod id;
pub mod notification;
pub mod source;

pub use change::percent_change;
pub use email::{Email, EmailError};
pub use id::*;
pub use notification::{NotificationKind, NotificationKindError};
pub use source::{MetricSource, MetricSourceError};
