//! Validation options.
//!
//! Defaults suit the live API: keys the schemas do not declare are ignored so
//! that new server-side fields do not break existing clients. Override via
//! environment variable or explicit construction.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Environment variable read by [`ValidationOptions::from_env`].
pub const UNKNOWN_KEYS_ENV: &str = "CVM_SCHEMA_UNKNOWN_KEYS";

/// Policy for object keys that a schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnknownKeys {
    /// Drop them from the normalized output.
    #[default]
    Ignore,
    /// Report each one as an `unknown-field` issue.
    Reject,
}

impl UnknownKeys {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownKeys::Ignore => "ignore",
            UnknownKeys::Reject => "reject",
        }
    }
}

impl fmt::Display for UnknownKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownKeys {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(UnknownKeys::Ignore),
            "reject" => Ok(UnknownKeys::Reject),
            _ => Err(ConfigError::InvalidValue {
                var: UNKNOWN_KEYS_ENV,
                value: s.to_string(),
            }),
        }
    }
}

/// Knobs for [`crate::validate::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub unknown_keys: UnknownKeys,
}

impl ValidationOptions {
    pub fn new(unknown_keys: UnknownKeys) -> Self {
        Self { unknown_keys }
    }

    /// Load options from environment variables.
    ///
    /// Variables:
    /// - `CVM_SCHEMA_UNKNOWN_KEYS`: `ignore` or `reject` (default: `ignore`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_unknown_keys_var(std::env::var(UNKNOWN_KEYS_ENV).ok())
    }

    fn from_unknown_keys_var(raw: Option<String>) -> Result<Self, ConfigError> {
        let unknown_keys = match raw {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => UnknownKeys::default(),
        };
        Ok(Self { unknown_keys })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: expected \"ignore\" or \"reject\"")]
    InvalidValue { var: &'static str, value: String },
}
