//! Errors raised while loading or checking `DindinhoConfig`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer failed to parse or a value had the wrong type.
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A section the server needs was left at its empty default.
    #[error("Configuration section '{section}' is not configured")]
    NotConfigured { section: String },

    /// `.env` exists but could not be read or parsed.
    #[error("Failed to load .env: {0}")]
    Dotenv(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn not_configured(section: &str) -> Self {
        Self::NotConfigured {
            section: section.to_string(),
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
