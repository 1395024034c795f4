//! Error handler for the TOTP engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Enum representing every failure the engine can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed secret: invalid base32 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("code must be exactly {expected} decimal digits")]
    InvalidCodeFormat { expected: u32 },

    #[error("secure random source unavailable")]
    RandomSourceUnavailable(#[source] rand::Error),

    #[error("invalid `{field}` configuration: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("no secret configured, run enrollment first")]
    NotConfigured,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("secret record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
