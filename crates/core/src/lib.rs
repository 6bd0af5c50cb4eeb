//! Tallybook Core - Shared domain types.
//!
//! This crate provides the types used by every Tallybook component:
//! - `server` - JSON API and reminder scheduler
//! - `cli` - Migrations, seeding and one-off maintenance commands
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Database encoding is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, notification kinds, metric sources and
//!   day-over-day percentage changes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
