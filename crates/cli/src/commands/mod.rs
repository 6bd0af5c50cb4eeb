//! CLI command implementations.

pub mod migrate;
pub mod remind;
pub mod seed;
pub mod users;
