//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::services::TokenIssuer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenIssuer,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state using the system clock.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self::with_clock(config, pool, Arc::new(SystemClock))
    }

    /// Create a new application state with an explicit clock.
    #[must_use]
    pub fn with_clock(config: ServerConfig, pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        let tokens = TokenIssuer::new(&config.auth);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                clock,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the token signer/verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Get the clock used for "today".
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }
}
