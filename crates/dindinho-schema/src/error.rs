//! Schema validation error types.

use std::fmt;

use dindinho_core::errors::{DomainError, ValidationIssue};
use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// JSON value did not pass schema validation.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// Individual error messages from the validator.
        errors: Vec<String>,
    },

    /// Schema generation or compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),
}

/// A rejected input: one issue per offending field, in discovery order.
///
/// Displays as the first issue's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    #[must_use]
    pub const fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// First issue's message, or a generic fallback when empty.
    #[must_use]
    pub fn message(&self) -> &str {
        self.issues
            .first()
            .map_or("Dados inválidos", |issue| issue.message.as_str())
    }

    /// Messages of every issue reported at `path`.
    #[must_use]
    pub fn messages_at(&self, path: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.path == path)
            .map(|issue| issue.message.as_str())
            .collect()
    }

    #[must_use]
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for DomainError {
    fn from(failure: ValidationFailure) -> Self {
        Self::validation(failure.issues)
    }
}
