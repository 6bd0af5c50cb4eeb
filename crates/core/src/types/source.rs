//! Metric source tag.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MetricSource`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MetricSourceError {
    /// The tag is longer than [`MetricSource::MAX_LENGTH`].
    #[error("source must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The tag contains characters other than ASCII letters, digits, `-` or `_`.
    #[error("source may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Where a daily metric was entered from (e.g. `APP`, `IMPORT`).
///
/// Tags are upper-cased. Missing or blank tags fall back to [`MetricSource::DEFAULT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSource(String);

impl MetricSource {
    /// Tag used when the client does not send one.
    pub const DEFAULT: &'static str = "APP";

    /// Maximum tag length.
    pub const MAX_LENGTH: usize = 32;

    /// Parse an optional tag, defaulting blank input to `APP`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is too long or contains unsupported characters.
    pub fn parse(raw: Option<&str>) -> Result<Self, MetricSourceError> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(MetricSourceError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(MetricSourceError::InvalidCharacter);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Wrap a value read back from storage.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MetricSource {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for MetricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
