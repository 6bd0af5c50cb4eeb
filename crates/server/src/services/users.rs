//! Profile management.

use sqlx::PgPool;
use thiserror::Error;

use tallybook_core::{Email, EmailError, UserId};

use crate::db::users::{UserChanges, UserRepository};
use crate::db::RepositoryError;
use crate::models::User;
use crate::services::auth::{self, AuthError};

/// Longest accepted locale tag, e.g. `fr-FR`.
const MAX_LOCALE_LENGTH: usize = 16;

/// Errors that can occur in profile operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,

    #[error("Email already in use")]
    EmailTaken,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

/// Requested profile changes. Absent fields are left as they are.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub locale: Option<String>,
}

/// User profile service.
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Load a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist.
    pub async fn get(&self, id: UserId) -> Result<User, UserError> {
        self.users.get_by_id(id).await?.ok_or(UserError::NotFound)
    }

    /// Apply a profile update.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmailTaken` if another account holds the new email,
    /// a validation error for bad fields.
    pub async fn update(&self, user: &User, update: &ProfileUpdate) -> Result<User, UserError> {
        let name = update
            .name
            .as_deref()
            .map(auth::validate_name)
            .transpose()?;

        let email = update.email.as_deref().map(Email::parse).transpose()?;

        let password_hash = match update.password.as_deref() {
            Some(password) => {
                auth::validate_password(password)?;
                Some(auth::hash_password(password)?)
            }
            None => None,
        };

        let locale = update.locale.as_deref().map(validate_locale).transpose()?;

        let changes = UserChanges {
            name,
            email: email.as_ref(),
            password_hash: password_hash.as_deref(),
            locale,
        };

        let updated = self.users.update(user.id, &changes).await?;
        tracing::info!(
            user_id = %user.id,
            email_changed = email.is_some(),
            password_changed = password_hash.is_some(),
            "Profile updated"
        );
        Ok(updated)
    }

    /// Register the device push token.
    ///
    /// # Errors
    ///
    /// Returns `UserError::Invalid` for a blank token.
    pub async fn set_push_token(&self, user: &User, token: &str) -> Result<(), UserError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(UserError::Invalid("fcm_token must not be empty".to_owned()));
        }
        self.users.set_fcm_token(user.id, token).await?;
        Ok(())
    }
}

fn validate_locale(locale: &str) -> Result<&str, UserError> {
    let locale = locale.trim();
    let valid = !locale.is_empty()
        && locale.len() <= MAX_LOCALE_LENGTH
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(locale)
    } else {
        Err(UserError::Invalid(format!("invalid locale '{locale}'")))
    }
}
