//! API response types returned as JSON by the HTTP server.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::errors::{DomainError, ValidationIssue};

/// The error envelope every failed request returns.
///
/// Closed object: unknown keys are rejected both by serde and by the
/// registered JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiErrorEnvelope {
    pub status_code: u16,
    /// HTTP reason phrase, e.g. `"Not Found"`.
    pub error: String,
    pub message: String,
    /// Upper snake case machine code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<ValidationIssue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorEnvelope {
    #[must_use]
    pub fn new(status_code: u16, code: &str, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error: reason_phrase(status_code).to_string(),
            message: message.into(),
            code: Some(code.to_string()),
            request_id: None,
            issues: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}

impl From<&DomainError> for ApiErrorEnvelope {
    fn from(err: &DomainError) -> Self {
        let mut envelope = Self::new(err.status_code(), err.code(), err.to_string());
        if !err.issues().is_empty() {
            envelope.issues = Some(err.issues().to_vec());
        }
        envelope.details = err.details().cloned();
        envelope
    }
}

/// Reason phrase for the statuses the API emits.
#[must_use]
pub const fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    }
}

/// Response from `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 timestamp of the check.
    pub timestamp: String,
    pub app: String,
}

/// Response from `GET /test-db`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbCheckResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one onboarding run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoLinkOutcome {
    pub accepted_invites: Vec<String>,
    pub granted_accounts: Vec<String>,
}

/// Response from `POST /api/auth/signup` and `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    /// Present on signup only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked: Option<AutoLinkOutcome>,
}
