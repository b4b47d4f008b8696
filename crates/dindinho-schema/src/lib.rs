//! # dindinho-schema
//!
//! Input validation for every payload the API accepts, plus the JSON Schema
//! registry for the wire types defined in `dindinho-core`.
//!
//! This crate provides:
//! - `schemas::*`: one `parse(&Value) -> Result<T, ValidationFailure>` per DTO,
//!   with string coercion, trimming and cross-field rules
//! - `Fields`: the issue-collecting reader those schemas are written with
//! - `SchemaRegistry`: schemars-generated JSON Schemas validated with `jsonschema`
//! - `normalize_email`: the canonical e-mail form used for invite matching
//!
//! ## Architecture
//!
//! Schemas never stop at the first problem. Each field read either yields a
//! value or records a [`ValidationIssue`](dindinho_core::errors::ValidationIssue)
//! with a dotted path, so the frontend can show every error next to its input.
//! User-facing messages are Portuguese; issue codes are stable identifiers.

pub mod dates;
pub mod email;
pub mod error;
pub mod fields;
pub mod filters;
pub mod registry;
pub mod schemas;

pub use email::normalize_email;
pub use error::{SchemaError, ValidationFailure};
pub use fields::Fields;
pub use registry::SchemaRegistry;
