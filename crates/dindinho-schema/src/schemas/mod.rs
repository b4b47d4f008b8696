//! Input schemas, one module per resource.
//!
//! Every schema exposes `parse(&serde_json::Value) -> Result<T, ValidationFailure>`.
//! Outputs serialize with camelCase keys and omit fields that were not provided,
//! so a partial update serializes to exactly the keys the caller sent.

pub mod account;
pub mod auth;
pub mod backlog;
pub mod docs;
pub mod envelope;
pub mod invite;
pub mod report;
pub mod transaction;
pub mod user;

use crate::fields::{Fields, IntRange, code};

/// Rejection message for partial updates with nothing to change.
pub const AT_LEAST_ONE_FIELD: &str = "Informe ao menos um campo para atualização";

pub(crate) const DAY_OF_MONTH: IntRange = IntRange {
    label: "Dia",
    min: 1,
    max: 31,
    message: "Dia deve estar entre 1 e 31",
};

pub(crate) const TZ_OFFSET_MINUTES: IntRange = IntRange {
    label: "Fuso horário",
    min: -720,
    max: 840,
    message: "Fuso horário inválido",
};

pub(crate) const PAGE_LIMIT: IntRange = IntRange {
    label: "Limite",
    min: 1,
    max: 100,
    message: "Limite deve estar entre 1 e 100",
};

/// Flag an update that carries no field, unless a field already failed.
pub(crate) fn require_any_field(fields: &mut Fields<'_>, is_empty: bool) {
    if is_empty && !fields.has_issues() {
        fields.issue("", AT_LEAST_ONE_FIELD, code::CUSTOM);
    }
}

/// Narrow an already range-checked integer.
pub(crate) fn narrow<T: TryFrom<i64>>(value: Option<i64>) -> Option<T> {
    value.and_then(|v| T::try_from(v).ok())
}

pub(crate) fn narrow_nullable<T: TryFrom<i64>>(value: Option<Option<i64>>) -> Option<Option<T>> {
    value.map(narrow)
}
