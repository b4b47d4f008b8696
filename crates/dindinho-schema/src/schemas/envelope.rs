//! Validation of API error envelopes received from (or sent to) clients.
//!
//! Goes through the JSON Schema registry so the closed-object rule and the
//! `code` pattern are checked by the same schema that is exported to the
//! frontend.

use std::sync::LazyLock;

use dindinho_core::errors::ValidationIssue;
use dindinho_core::responses::ApiErrorEnvelope;
use serde_json::Value;

use crate::error::ValidationFailure;
use crate::fields::code;
use crate::registry::{ERROR_ENVELOPE, SchemaRegistry};

static REGISTRY: LazyLock<Option<SchemaRegistry>> = LazyLock::new(|| SchemaRegistry::new().ok());

fn failure(message: String) -> ValidationFailure {
    ValidationFailure::new(vec![ValidationIssue::new("", message, code::CUSTOM)])
}

/// Validate and decode an error envelope.
///
/// # Errors
///
/// One issue per schema violation: `unrecognized_keys` for extra keys,
/// `invalid_string` for a malformed `code`, `invalid_type` for missing or
/// mistyped fields.
pub fn parse(input: &Value) -> Result<ApiErrorEnvelope, ValidationFailure> {
    let registry = REGISTRY
        .as_ref()
        .ok_or_else(|| failure("Esquema de erro indisponível".to_string()))?;
    registry
        .check(ERROR_ENVELOPE, input)
        .map_err(|e| failure(e.to_string()))??;
    serde_json::from_value(input.clone()).map_err(|e| failure(e.to_string()))
}
