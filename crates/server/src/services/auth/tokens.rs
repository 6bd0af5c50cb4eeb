//! Signed bearer tokens.
//!
//! Access and refresh tokens are HS256 JWTs whose subject is the user's email.
//! Both kinds carry the same claims and differ only in lifetime.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tallybook_core::Email;

use crate::config::{AuthConfig, jwt_secret_bytes};

/// Token type reported to clients.
pub const TOKEN_TYPE: &str = "bearer";

/// Errors from signing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime out of range")]
    Lifetime,
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Access/refresh token pair returned by register, login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build an issuer from the server's auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self::from_secret(
            jwt_secret_bytes(config),
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    /// Build an issuer from raw key bytes.
    #[must_use]
    pub fn from_secret(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Sign a token for `subject` valid for `ttl` from `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Lifetime` if the expiry overflows,
    /// `TokenError::Encode` if signing fails.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::Lifetime)?;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Sign a short-lived access token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue_access_token(&self, email: &Email) -> Result<String, TokenError> {
        self.issue_at(email.as_str(), self.access_ttl, Utc::now())
    }

    /// Sign a long-lived refresh token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue_refresh_token(&self, email: &Email) -> Result<String, TokenError> {
        self.issue_at(email.as_str(), self.refresh_ttl, Utc::now())
    }

    /// Sign both tokens for `email`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue_pair(&self, email: &Email) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(email)?,
            refresh_token: self.issue_refresh_token(email)?,
            token_type: TOKEN_TYPE,
        })
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Decode` for malformed, expired or foreign tokens.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Decode)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::from_secret(secret.as_bytes(), Duration::hours(24), Duration::days(30))
    }

    fn email() -> Email {
        Email::parse("owner@bakery.fr").unwrap()
    }

    #[test]
    fn test_access_token_round_trip() {
        let tokens = issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA");
        let token = tokens.issue_access_token(&email()).unwrap();
        let claims = tokens.decode(&token).unwrap();
        assert_eq!(claims.sub, "owner@bakery.fr");
        assert_eq!(claims.exp - claims.iat, Duration::hours(24).num_seconds());
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let tokens = issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA");
        let claims = tokens
            .decode(&tokens.issue_refresh_token(&email()).unwrap())
            .unwrap();
        assert_eq!(claims.exp - claims.iat, Duration::days(30).num_seconds());
    }

    #[test]
    fn test_pair_has_bearer_type() {
        let pair = issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA")
            .issue_pair(&email())
            .unwrap();
        assert_eq!(pair.token_type, "bearer");
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA")
            .issue_access_token(&email())
            .unwrap();
        assert!(issuer("Zq8!mW3@xK5#cV7$bN1%hJ4^gF6&dS2*").decode(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA");
        let issued = Utc::now() - Duration::hours(3);
        let token = tokens
            .issue_at("owner@bakery.fr", Duration::hours(1), issued)
            .unwrap();
        assert!(tokens.decode(&token).is_err());
    }

    #[test]
    fn test_overflowing_lifetime_is_an_error() {
        let tokens = issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA");
        let result = tokens.issue_at("owner@bakery.fr", Duration::MAX, Utc::now());
        assert!(matches!(result, Err(TokenError::Lifetime)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(issuer("k7#Qz!vB2@pL9$wX4^mN6&rT1*yU8(eA")
            .decode("not.a.token")
            .is_err());
    }
}
