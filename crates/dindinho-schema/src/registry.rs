//! Central schema registry for the Dindinho wire types.
//!
//! The `SchemaRegistry` builds JSON Schemas from dindinho-core types at
//! construction time using [`schemars::schema_for!`] and validates instances
//! with `jsonschema`. The error envelope gets an extra `pattern` on `code`,
//! which the derive cannot express.

use std::collections::HashMap;

use dindinho_core::errors::ValidationIssue;
use jsonschema::error::ValidationErrorKind;
use schemars::schema_for;
use serde_json::{Value, json};

use crate::error::{SchemaError, ValidationFailure};
use crate::fields::code;

/// Registry name of the API error envelope schema.
pub const ERROR_ENVELOPE: &str = "error_envelope";

/// Machine codes are upper snake case.
pub const ERROR_CODE_PATTERN: &str = "^[A-Z][A-Z0-9_]*$";

pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert(
            $name,
            serde_json::to_value(schema_for!($ty)).map_err(|e| SchemaError::Generation(e.to_string()))?,
        );
    };
}

impl SchemaRegistry {
    /// Build the registry with every entity, response and audit-detail schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::Generation` if a generated schema cannot be turned into JSON.
    pub fn new() -> Result<Self, SchemaError> {
        let mut schemas = HashMap::new();

        // --- Entities ---
        register!(schemas, "user", dindinho_core::entities::User);
        register!(schemas, "account", dindinho_core::entities::Account);
        register!(schemas, "account_access", dindinho_core::entities::AccountAccess);
        register!(schemas, "invite", dindinho_core::entities::Invite);
        register!(schemas, "audit_entry", dindinho_core::entities::AuditEntry);

        // --- Responses ---
        register!(schemas, ERROR_ENVELOPE, dindinho_core::responses::ApiErrorEnvelope);
        register!(schemas, "health_response", dindinho_core::responses::HealthResponse);
        register!(schemas, "db_check_response", dindinho_core::responses::DbCheckResponse);
        register!(schemas, "auth_response", dindinho_core::responses::AuthResponse);

        // --- Audit details ---
        register!(
            schemas,
            "auto_link_invite_detail",
            dindinho_core::audit_detail::AutoLinkInviteDetail
        );
        register!(
            schemas,
            "invite_created_detail",
            dindinho_core::audit_detail::InviteCreatedDetail
        );
        register!(
            schemas,
            "account_updated_detail",
            dindinho_core::audit_detail::AccountUpdatedDetail
        );

        if let Some(code_schema) = schemas
            .get_mut(ERROR_ENVELOPE)
            .and_then(|schema| schema.pointer_mut("/properties/code"))
            .and_then(Value::as_object_mut)
        {
            code_schema.insert("pattern".to_string(), json!(ERROR_CODE_PATTERN));
        }

        Ok(Self { schemas })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// `SchemaError::NotFound` for an unknown name, `SchemaError::ValidationFailed`
    /// with the validator's messages otherwise.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let issues = self.issues(name, instance)?;
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                errors: issues
                    .into_iter()
                    .map(|issue| format!("{}: {}", issue.path, issue.message))
                    .collect(),
            })
        }
    }

    /// Validate and report failures as structured issues.
    ///
    /// # Errors
    ///
    /// `SchemaError::NotFound` or `SchemaError::Generation` when the schema
    /// itself is unusable. Instance failures are returned as `Ok(Err(..))`.
    pub fn check(
        &self,
        name: &str,
        instance: &Value,
    ) -> Result<Result<(), ValidationFailure>, SchemaError> {
        let issues = self.issues(name, instance)?;
        Ok(if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(issues))
        })
    }

    fn issues(&self, name: &str, instance: &Value) -> Result<Vec<ValidationIssue>, SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let mut issues = Vec::new();
        for error in validator.iter_errors(instance) {
            let path = pointer_to_path(&error.instance_path.to_string());
            match &error.kind {
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for key in unexpected {
                        let key_path = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{path}.{key}")
                        };
                        issues.push(ValidationIssue::new(
                            key_path,
                            format!("Campo não reconhecido: {key}"),
                            "unrecognized_keys",
                        ));
                    }
                }
                ValidationErrorKind::Pattern { .. } => {
                    issues.push(ValidationIssue::new(path, error.to_string(), code::INVALID_STRING));
                }
                ValidationErrorKind::Required { .. } | ValidationErrorKind::Type { .. } => {
                    issues.push(ValidationIssue::new(path, error.to_string(), code::INVALID_TYPE));
                }
                _ => issues.push(ValidationIssue::new(path, error.to_string(), code::CUSTOM)),
            }
        }
        Ok(issues)
    }

    /// All registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

/// `/issues/0/path` → `issues.0.path`.
fn pointer_to_path(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}
