//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! tallybook user create -e owner@example.com -n "Awa" -p "long enough"
//! ```

use tallybook_core::{Email, EmailError};
use tallybook_server::config::{ConfigError, database_url_from_env};
use tallybook_server::db::{self, RepositoryError, UserRepository};
use tallybook_server::models::user::DEFAULT_LOCALE;
use tallybook_server::services::AuthError;
use tallybook_server::services::auth::{hash_password, validate_name, validate_password};
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserCommandError {
    /// Database URL missing.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password or name rejected.
    #[error("{0}")]
    Invalid(#[from] AuthError),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Insert failed.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Create a new account.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserCommandError` for invalid input, a taken email or a database failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, UserCommandError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let name = validate_name(name)?;

    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating user: {} ({})", email, name);
    let password_hash = hash_password(password)?;

    let user = UserRepository::new(&pool)
        .create(&email, name, &password_hash, DEFAULT_LOCALE)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserCommandError::UserExists(email.to_string()),
            other => UserCommandError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(user.id.as_i32())
}
