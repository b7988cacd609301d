use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use thiserror::Error;

/// How strictly submissions are checked before they are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Reject submissions with missing names, malformed counts, unknown
    /// onboarding status or an unreadable visit time.
    #[default]
    Strict,
    /// Store whatever arrives; an unreadable visit time is dropped.
    Permissive,
}

#[derive(Debug, Error)]
#[error("unknown validation mode '{0}' (expected 'strict' or 'permissive')")]
pub struct UnknownValidationMode(String);

impl FromStr for ValidationMode {
    type Err = UnknownValidationMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(UnknownValidationMode(other.to_string())),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Strict => f.write_str("strict"),
            ValidationMode::Permissive => f.write_str("permissive"),
        }
    }
}

/// Settings shared by ingestion and export.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// Zone used to read naive timestamps and to render report times.
    pub timezone: Tz,
    pub validation: ValidationMode,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            validation: ValidationMode::default(),
        }
    }
}
