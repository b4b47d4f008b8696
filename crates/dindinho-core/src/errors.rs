//! Domain error taxonomy for Dindinho.
//!
//! Domain code returns the specific kind; the HTTP boundary maps each kind to a
//! status and machine code via [`DomainError::status_code`] and
//! [`DomainError::code`]. Storage errors (`DatabaseError`) and configuration
//! errors live in their own crates and are mapped at the boundary too.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation problem.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the offending field (`accounts.0.permission`); empty for the root.
    pub path: String,
    pub message: String,
    /// Machine-readable reason, e.g. `invalid_type`, `too_small`, `custom`.
    pub code: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Errors raised by domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// 404: the requested resource does not exist or is not visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// 409: the request conflicts with current state (duplicate email, closed invite).
    #[error("{0}")]
    Conflict(String),

    /// 401: missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// 403: authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// 422: input failed validation. Carries the per-field issues.
    #[error("{message}")]
    Validation {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    /// 429: too many requests.
    #[error("{0}")]
    RateLimited(String),

    /// Unclassified domain error with caller-supplied status and code (400 by default).
    #[error("{message}")]
    Other {
        message: String,
        status: u16,
        code: String,
        details: Option<serde_json::Value>,
    },
}

impl DomainError {
    /// Base domain error: status 400, code `DOMAIN_ERROR`.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            status: 400,
            code: "DOMAIN_ERROR".to_string(),
            details: None,
        }
    }

    /// Build a validation error whose message is the first issue's message.
    #[must_use]
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        let message = issues
            .first()
            .map_or_else(|| "Dados inválidos".to_string(), |i| i.message.clone());
        Self::Validation { message, issues }
    }

    /// Override the status of a base error. Other kinds keep their fixed status.
    #[must_use]
    pub fn with_status(mut self, new_status: u16) -> Self {
        if let Self::Other { status, .. } = &mut self {
            *status = new_status;
        }
        self
    }

    /// Override the machine code of a base error.
    #[must_use]
    pub fn with_code(mut self, new_code: impl Into<String>) -> Self {
        if let Self::Other { code, .. } = &mut self {
            *code = new_code.into();
        }
        self
    }

    /// Attach opaque details to a base error.
    #[must_use]
    pub fn with_details(mut self, value: serde_json::Value) -> Self {
        if let Self::Other { details, .. } = &mut self {
            *details = Some(value);
        }
        self
    }

    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::Validation { .. } => 422,
            Self::RateLimited(_) => 429,
            Self::Other { status, .. } => *status,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::Other { code, .. } => code,
        }
    }

    /// Structured validation issues, empty for non-validation kinds.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation { issues, .. } => issues,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Other { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_kinds_map_to_status_and_code() {
        let cases = [
            (DomainError::NotFound("x".into()), 404, "NOT_FOUND"),
            (DomainError::Conflict("x".into()), 409, "CONFLICT"),
            (DomainError::Unauthorized("x".into()), 401, "UNAUTHORIZED"),
            (DomainError::Forbidden("x".into()), 403, "FORBIDDEN"),
            (DomainError::RateLimited("x".into()), 429, "RATE_LIMITED"),
            (DomainError::validation(vec![]), 422, "VALIDATION_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn base_error_defaults_and_overrides() {
        let err = DomainError::new("Saldo insuficiente");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "DOMAIN_ERROR");
        assert!(err.details().is_none());

        let err = err
            .with_status(418)
            .with_code("INSUFFICIENT_FUNDS")
            .with_details(serde_json::json!({ "accountId": "acc-1" }));
        assert_eq!(err.status_code(), 418);
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(err.details().unwrap()["accountId"], "acc-1");
        assert_eq!(err.to_string(), "Saldo insuficiente");
    }

    #[test]
    fn overrides_do_not_touch_fixed_kinds() {
        let err = DomainError::NotFound("Conta não encontrada".into()).with_status(500);
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn validation_message_is_first_issue() {
        let err = DomainError::validation(vec![
            ValidationIssue::new("name", "Nome é obrigatório", "too_small"),
            ValidationIssue::new("type", "Tipo inválido", "invalid_enum_value"),
        ]);
        assert_eq!(err.to_string(), "Nome é obrigatório");
        assert_eq!(err.issues().len(), 2);
    }
}
