//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TALLYBOOK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `TALLYBOOK_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `TALLYBOOK_HOST` - Bind address (default: 127.0.0.1)
//! - `TALLYBOOK_PORT` - Listen port (default: 8000)
//! - `TALLYBOOK_ACCESS_TOKEN_HOURS` - Access token lifetime, 1 to 720 (default: 24)
//! - `TALLYBOOK_REFRESH_TOKEN_DAYS` - Refresh token lifetime, 1 to 365 (default: 30)
//! - `TALLYBOOK_REMINDER_TIME` - Daily reminder wall-clock time, `HH:MM` (default: 20:00)
//! - `TALLYBOOK_REMINDERS_ENABLED` - Run the reminder scheduler (default: true)
//! - `TALLYBOOK_CORS_ORIGINS` - Comma-separated allowed origins (default: any)
//! - `TALLYBOOK_AUTH_RATE_LIMIT` - Rate limit login/register per IP (default: true)
//! - `TALLYBOOK_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `PUSH_GATEWAY_URL` - Push gateway endpoint (default: log-only gateway)
//! - `PUSH_GATEWAY_KEY` - Bearer key for the push gateway
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing configuration
    pub auth: AuthConfig,
    /// Daily reminder configuration
    pub reminders: ReminderConfig,
    /// Push gateway endpoint; `None` uses the log-only gateway
    pub push: Option<PushGatewayConfig>,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Rate limit `/login` and `/register` per client IP
    pub auth_rate_limit: bool,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Token signing configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: SecretString,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// Daily reminder configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReminderConfig {
    /// Whether the scheduler is started with the server
    pub enabled: bool,
    /// Local wall-clock time at which reminders fire
    pub fire_at: NaiveTime,
}

/// Push gateway endpoint configuration.
#[derive(Clone)]
pub struct PushGatewayConfig {
    /// Endpoint receiving `{token, title, body}` POSTs
    pub url: Url,
    /// Optional bearer key
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for PushGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushGatewayConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TALLYBOOK_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("TALLYBOOK_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("TALLYBOOK_PORT", "8000")?;

        let auth = AuthConfig::from_env()?;
        let reminders = ReminderConfig::from_env()?;
        let push = PushGatewayConfig::from_env()?;

        let cors_origins = get_optional_env("TALLYBOOK_CORS_ORIGINS")
            .map(|raw| parse_origin_list(&raw))
            .unwrap_or_default();
        let auth_rate_limit = parse_bool(&get_env_or_default("TALLYBOOK_AUTH_RATE_LIMIT", "true"))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TALLYBOOK_AUTH_RATE_LIMIT".to_string(), e)
            })?;
        let log_json = parse_bool(&get_env_or_default("TALLYBOOK_LOG_JSON", "false"))
            .map_err(|e| ConfigError::InvalidEnvVar("TALLYBOOK_LOG_JSON".to_string(), e))?;

        Ok(Self {
            database_url,
            host,
            port,
            auth,
            reminders,
            push,
            cors_origins,
            auth_rate_limit,
            log_json,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_required_env("TALLYBOOK_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "TALLYBOOK_JWT_SECRET")?;

        let access_token_ttl = ttl_within(
            "TALLYBOOK_ACCESS_TOKEN_HOURS",
            parse_env_or_default("TALLYBOOK_ACCESS_TOKEN_HOURS", "24")?,
            MAX_ACCESS_TOKEN_HOURS,
            Duration::try_hours,
        )?;
        let refresh_token_ttl = ttl_within(
            "TALLYBOOK_REFRESH_TOKEN_DAYS",
            parse_env_or_default("TALLYBOOK_REFRESH_TOKEN_DAYS", "30")?,
            MAX_REFRESH_TOKEN_DAYS,
            Duration::try_days,
        )?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            access_token_ttl,
            refresh_token_ttl,
        })
    }
}

impl ReminderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = parse_bool(&get_env_or_default("TALLYBOOK_REMINDERS_ENABLED", "true"))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TALLYBOOK_REMINDERS_ENABLED".to_string(), e)
            })?;
        let fire_at = parse_fire_time(&get_env_or_default("TALLYBOOK_REMINDER_TIME", "20:00"))
            .map_err(|e| ConfigError::InvalidEnvVar("TALLYBOOK_REMINDER_TIME".to_string(), e))?;

        Ok(Self { enabled, fire_at })
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fire_at: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl PushGatewayConfig {
    /// Load the push gateway endpoint. `None` when `PUSH_GATEWAY_URL` is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = get_optional_env("PUSH_GATEWAY_URL") else {
            return Ok(None);
        };
        let url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PUSH_GATEWAY_URL".to_string(), e.to_string()))?;

        Ok(Some(Self {
            url,
            api_key: get_optional_env("PUSH_GATEWAY_KEY").map(SecretString::from),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Database URL alone, for tools that need nothing else.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `TALLYBOOK_DATABASE_URL`
/// nor `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url("TALLYBOOK_DATABASE_URL")
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional, non-blank environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Longest accepted access token lifetime (30 days).
const MAX_ACCESS_TOKEN_HOURS: i64 = 24 * 30;

/// Longest accepted refresh token lifetime.
const MAX_REFRESH_TOKEN_DAYS: i64 = 365;

/// Turn a positive count of `unit`s no larger than `max` into a lifetime.
fn ttl_within(
    key: &str,
    count: i64,
    max: i64,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    if !(1..=max).contains(&count) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 1 and {max}"),
        ));
    }
    unit(count)
        .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), "out of range".to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}

/// Parse a `HH:MM` (or `HH:MM:SS`) wall-clock time.
fn parse_fire_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| format!("expected HH:MM, got '{raw}': {e}"))
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Validate that the JWT secret is long enough and not a placeholder.
fn validate_jwt_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }
    validate_secret_strength(secret, var_name)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Expose the signing secret bytes (used when building token keys).
#[must_use]
pub fn jwt_secret_bytes(auth: &AuthConfig) -> &[u8] {
    auth.jwt_secret.expose_secret().as_bytes()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("aaaaaaa").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_jwt_secret_too_short() {
        let err = validate_jwt_secret("k7#Qz!", "TALLYBOOK_JWT_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_jwt_secret_placeholder() {
        let err = validate_jwt_secret(
            "changeme-changeme-changeme-changeme",
            "TALLYBOOK_JWT_SECRET",
        )
        .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_jwt_secret_low_entropy() {
        let result = validate_jwt_secret(&"ab".repeat(20), "TALLYBOOK_JWT_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_jwt_secret_valid() {
        let result = validate_jwt_secret("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6v", "TALLYBOOK_JWT_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_fire_time() {
        assert_eq!(
            parse_fire_time("20:00").unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap()
        );
        assert_eq!(
            parse_fire_time(" 07:30:15 ").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 15).unwrap()
        );
        assert!(parse_fire_time("25:00").is_err());
        assert!(parse_fire_time("8pm").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_origin_list() {
        assert_eq!(
            parse_origin_list("https://a.example, ,https://b.example "),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_ttl_within_bounds() {
        assert_eq!(
            ttl_within("K", 24, MAX_ACCESS_TOKEN_HOURS, Duration::try_hours).unwrap(),
            Duration::hours(24)
        );
        assert_eq!(
            ttl_within("K", 365, MAX_REFRESH_TOKEN_DAYS, Duration::try_days).unwrap(),
            Duration::days(365)
        );
    }

    #[test]
    fn test_ttl_out_of_bounds() {
        for count in [0, -5, MAX_ACCESS_TOKEN_HOURS + 1, i64::MAX] {
            let err = ttl_within("TALLYBOOK_ACCESS_TOKEN_HOURS", count, MAX_ACCESS_TOKEN_HOURS, Duration::try_hours)
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "TALLYBOOK_ACCESS_TOKEN_HOURS"),
                "{count}"
            );
        }
        assert!(ttl_within("K", i64::MAX, i64::MAX, Duration::try_days).is_err());
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: SecretString::from("super_private_signing_key_value_123"),
            access_token_ttl: Duration::hours(24),
            refresh_token_ttl: Duration::days(30),
        };
        let debug_output = format!("{auth:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_signing_key_value_123"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/tallybook"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            auth: AuthConfig {
                jwt_secret: SecretString::from("x".repeat(32)),
                access_token_ttl: Duration::hours(24),
                refresh_token_ttl: Duration::days(30),
            },
            reminders: ReminderConfig::default(),
            push: None,
            cors_origins: Vec::new(),
            auth_rate_limit: false,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }
}
