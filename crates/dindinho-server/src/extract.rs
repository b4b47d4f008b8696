//! Request extractors that reject with the error envelope.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use dindinho_core::errors::DomainError;
use serde_json::{Value, json};

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::state::AppState;

pub const MISSING_TOKEN: &str = "Token de acesso ausente";
pub const INVALID_BODY: &str = "Corpo da requisição inválido";

/// Raw JSON body, handed to a schema's `parse` for field-level validation.
pub struct JsonBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(DomainError::new(INVALID_BODY)
                .with_status(rejection.status().as_u16())
                .with_code("INVALID_BODY")
                .with_details(json!({ "reason": rejection.body_text() }))
                .into()),
        }
    }
}

/// The caller identified by a `Bearer` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))?;

        let claims = verify_token(&state.config.auth, token)?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}
