//! Authentication service.
//!
//! Provides password registration/login and bearer token resolution.

mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{Claims, TokenError, TokenIssuer, TokenPair};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use tallybook_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::models::user::DEFAULT_LOCALE;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles user registration, login, and token issuance/verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenIssuer) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user with email, password and display name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::EmptyName` if the name is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let name = validate_name(name)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, name, &password_hash, DEFAULT_LOCALE)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check an email/password pair.
    ///
    /// Returns `None` for an unknown email, a malformed email, or a wrong
    /// password alike.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the user lookup fails.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            return Ok(None);
        };

        match verify_password(password, &password_hash) {
            Ok(()) => Ok(Some(user)),
            Err(AuthError::InvalidCredentials) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Issue an access/refresh token pair for `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(self.tokens.issue_pair(&user.email)?)
    }

    /// Resolve a bearer token to its user.
    ///
    /// Malformed, expired or foreign tokens resolve to `None`, as do tokens
    /// whose subject no longer matches an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the user lookup fails.
    pub async fn resolve_user(&self, token: &str) -> Result<Option<User>, AuthError> {
        let claims = match self.tokens.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return Ok(None);
            }
        };

        let Ok(email) = Email::parse(&claims.sub) else {
            return Ok(None);
        };

        Ok(self.users.get_by_email(&email).await?)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for passwords shorter than eight characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Trim a display name, rejecting blank names.
///
/// # Errors
///
/// Returns `AuthError::EmptyName` for a blank name.
pub fn validate_name(name: &str) -> Result<&str, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::EmptyName);
    }
    Ok(name)
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
