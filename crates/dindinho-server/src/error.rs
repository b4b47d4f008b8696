//! HTTP error boundary.
//!
//! Every handler returns `Result<_, ApiError>`. The response body is always an
//! [`ApiErrorEnvelope`]; storage failures are logged here and reported as a
//! generic 500 so internals never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dindinho_core::errors::DomainError;
use dindinho_core::responses::ApiErrorEnvelope;
use dindinho_db::error::DatabaseError;
use dindinho_schema::ValidationFailure;
use thiserror::Error;

pub const NOT_FOUND: &str = "Recurso não encontrado";
pub const INTERNAL: &str = "Erro interno do servidor";
pub const INTERNAL_CODE: &str = "INTERNAL_ERROR";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A classified error with its own status and code.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage failure; classified on the way out.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Anything else that should surface as a 500.
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Domain(failure.into())
    }
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::NotFound(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::Unauthorized(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::Forbidden(message.into()))
    }

    /// The envelope this error is reported as.
    #[must_use]
    pub fn envelope(&self) -> ApiErrorEnvelope {
        match self {
            Self::Domain(err) => ApiErrorEnvelope::from(err),
            Self::Database(err) => match classify(err) {
                Some(domain) => ApiErrorEnvelope::from(&domain),
                None => internal_envelope(),
            },
            Self::Internal(_) => internal_envelope(),
        }
    }
}

/// Storage errors that carry a client-facing meaning.
fn classify(err: &DatabaseError) -> Option<DomainError> {
    match err {
        DatabaseError::NoResult => Some(DomainError::NotFound(NOT_FOUND.to_string())),
        DatabaseError::Conflict(message) => Some(DomainError::Conflict(message.clone())),
        DatabaseError::InvalidState(message) => Some(
            DomainError::new(message.clone())
                .with_status(409)
                .with_code("INVALID_STATE"),
        ),
        _ => None,
    }
}

fn internal_envelope() -> ApiErrorEnvelope {
    ApiErrorEnvelope::new(500, INTERNAL_CODE, INTERNAL)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = self.envelope();
        if envelope.status_code >= 500 {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = envelope.status_code, error = %self, "request rejected");
        }
        let status = StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dindinho_core::errors::ValidationIssue;
    use pretty_assertions::assert_eq;

    #[test]
    fn database_errors_are_classified() {
        let cases = [
            (DatabaseError::NoResult, 404, "NOT_FOUND"),
            (DatabaseError::Conflict("E-mail já cadastrado".into()), 409, "CONFLICT"),
            (DatabaseError::InvalidState("Convite expirado".into()), 409, "INVALID_STATE"),
            (DatabaseError::Query("syntax error".into()), 500, INTERNAL_CODE),
        ];
        for (err, status, code) in cases {
            let envelope = ApiError::from(err).envelope();
            assert_eq!(envelope.status_code, status);
            assert_eq!(envelope.code.as_deref(), Some(code));
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        let envelope = ApiError::from(DatabaseError::Query("no such table: users".into())).envelope();
        assert_eq!(envelope.message, INTERNAL);
        assert_eq!(envelope.error, "Internal Server Error");
    }

    #[test]
    fn validation_failure_keeps_issues() {
        let failure = ValidationFailure::new(vec![ValidationIssue::new("name", "Nome é obrigatório", "too_small")]);
        let envelope = ApiError::from(failure).envelope();
        assert_eq!(envelope.status_code, 422);
        assert_eq!(envelope.issues.unwrap()[0].path, "name");
    }
}
