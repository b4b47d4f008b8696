//! Field reader shared by every schema.
//!
//! `Fields` walks one JSON object, applies the coercion rules (trimming,
//! numeric strings, empty string as `null`) and collects a [`ValidationIssue`]
//! per bad field instead of stopping at the first one. Schemas read all fields,
//! run their cross-field rules, then call [`Fields::finish`].
//!
//! Return shapes follow one convention:
//! - `Option<T>`: `None` when the key is absent (or null for non-nullable fields)
//!   or when the value was rejected.
//! - `Option<Option<T>>`: outer `None` when absent, `Some(None)` for an explicit
//!   clear (`null`, or `""` where empty coerces to null).

use chrono::{DateTime, NaiveDate, Utc};
use dindinho_core::errors::ValidationIssue;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::dates;
use crate::error::ValidationFailure;

/// Issue codes, matching the vocabulary the frontend already maps.
pub mod code {
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const INVALID_ENUM: &str = "invalid_enum_value";
    pub const INVALID_STRING: &str = "invalid_string";
    pub const INVALID_DATE: &str = "invalid_date";
    pub const TOO_SMALL: &str = "too_small";
    pub const TOO_BIG: &str = "too_big";
    pub const CUSTOM: &str = "custom";
}

/// Length rule and messages for a text field.
#[derive(Debug, Clone, Copy)]
pub struct Text {
    pub label: &'static str,
    pub required: &'static str,
    pub min: usize,
    pub max: usize,
}

impl Text {
    pub const fn new(label: &'static str, required: &'static str, max: usize) -> Self {
        Self {
            label,
            required,
            min: 1,
            max,
        }
    }

    pub const fn min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }
}

/// Inclusive integer bounds with the message used when a value falls outside.
#[derive(Debug, Clone, Copy)]
pub struct IntRange {
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub message: &'static str,
}

enum Slot<'a> {
    Absent,
    Null,
    Present(&'a Value),
}

pub struct Fields<'a> {
    map: Option<&'a Map<String, Value>>,
    prefix: String,
    issues: Vec<ValidationIssue>,
}

impl<'a> Fields<'a> {
    /// Reader over a top-level payload.
    pub fn new(input: &'a Value) -> Self {
        Self::nested(input, "")
    }

    /// Reader over a nested object; issue paths are prefixed with `prefix`.
    pub fn nested(input: &'a Value, prefix: &str) -> Self {
        let mut fields = Self {
            map: input.as_object(),
            prefix: prefix.to_string(),
            issues: Vec::new(),
        };
        if fields.map.is_none() {
            fields.issue("", "Esperado um objeto", code::INVALID_TYPE);
        }
        fields
    }

    fn path(&self, key: &str) -> String {
        if key.is_empty() {
            self.prefix.trim_end_matches('.').to_string()
        } else {
            format!("{}{key}", self.prefix)
        }
    }

    fn slot(&self, key: &str) -> Slot<'a> {
        match self.map.and_then(|m| m.get(key)) {
            None => Slot::Absent,
            Some(Value::Null) => Slot::Null,
            Some(value) => Slot::Present(value),
        }
    }

    /// The raw value under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key))
    }

    /// Whether the key is present at all, `null` included.
    pub fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Whether the key carries a real value: not absent, not `null`, not a blank string.
    pub fn provided(&self, key: &str) -> bool {
        match self.raw(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Record an issue at `key` (empty key = this object itself).
    pub fn issue(&mut self, key: &str, message: impl Into<String>, code: &str) {
        let path = self.path(key);
        self.issues.push(ValidationIssue::new(path, message, code));
    }

    pub fn has_issue_at(&self, key: &str) -> bool {
        let path = self.path(key);
        self.issues.iter().any(|issue| issue.path == path)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Take over the issues collected by a nested reader.
    pub fn absorb(&mut self, nested: Self) {
        self.issues.extend(nested.issues);
    }

    /// `Ok(value)` when no issue was recorded.
    ///
    /// # Errors
    ///
    /// Returns every collected issue as a [`ValidationFailure`].
    pub fn finish<T>(self, value: T) -> Result<T, ValidationFailure> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(ValidationFailure::new(self.issues))
        }
    }

    /// Like [`Self::finish`], for outputs that can only be built once every
    /// required field was read. A `None` with no recorded issue still fails.
    ///
    /// # Errors
    ///
    /// Returns every collected issue as a [`ValidationFailure`].
    pub fn finish_some<T>(mut self, value: Option<T>) -> Result<T, ValidationFailure> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => {
                if self.issues.is_empty() {
                    self.issue("", "Dados inválidos", code::CUSTOM);
                }
                Err(ValidationFailure::new(self.issues))
            }
        }
    }

    // -- text ---------------------------------------------------------------

    fn check_text(&mut self, key: &str, value: &Value, rule: Text) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.issue(key, format!("{} deve ser um texto", rule.label), code::INVALID_TYPE);
            return None;
        };
        let trimmed = s.trim();
        let len = trimmed.chars().count();
        if len < rule.min {
            let message = if rule.min <= 1 {
                rule.required.to_string()
            } else {
                format!("{} deve ter pelo menos {} caracteres", rule.label, rule.min)
            };
            self.issue(key, message, code::TOO_SMALL);
            return None;
        }
        if len > rule.max {
            self.issue(
                key,
                format!("{} deve ter no máximo {} caracteres", rule.label, rule.max),
                code::TOO_BIG,
            );
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Trimmed text that must be present.
    pub fn required_text(&mut self, key: &str, rule: Text) -> Option<String> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => {
                self.issue(key, rule.required, code::INVALID_TYPE);
                None
            }
            Slot::Present(value) => self.check_text(key, value, rule),
        }
    }

    /// Trimmed text that may be absent. A blank value is still checked against `min`.
    pub fn optional_text(&mut self, key: &str, rule: Text) -> Option<String> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => None,
            Slot::Present(value) => self.check_text(key, value, rule),
        }
    }

    /// Trimmed text where `null` or a blank string clears the field.
    pub fn nullable_text(&mut self, key: &str, rule: Text) -> Option<Option<String>> {
        match self.slot(key) {
            Slot::Absent => None,
            Slot::Null => Some(None),
            Slot::Present(Value::String(s)) if s.trim().is_empty() => Some(None),
            Slot::Present(value) => self.check_text(key, value, rule).map(Some),
        }
    }

    /// Non-blank identifier.
    pub fn required_id(&mut self, key: &str, required: &'static str) -> Option<String> {
        self.required_text(key, Text::new("Identificador", required, 64))
    }

    pub fn optional_id(&mut self, key: &str) -> Option<String> {
        match self.slot(key) {
            Slot::Present(Value::String(s)) if s.trim().is_empty() => None,
            _ => self.optional_text(key, Text::new("Identificador", "Identificador inválido", 64)),
        }
    }

    pub fn nullable_id(&mut self, key: &str) -> Option<Option<String>> {
        self.nullable_text(key, Text::new("Identificador", "Identificador inválido", 64))
    }

    // -- numbers ------------------------------------------------------------

    /// Number coerced from a JSON number or a numeric string.
    ///
    /// Absent → `None`; `null` or `""` → `Some(None)`.
    pub fn number(&mut self, key: &str, label: &str) -> Option<Option<f64>> {
        let value = match self.slot(key) {
            Slot::Absent => return None,
            Slot::Null => return Some(None),
            Slot::Present(value) => value,
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if s.trim().is_empty() => return Some(None),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        };
        if parsed.is_none() {
            self.issue(key, format!("{label} deve ser um número"), code::INVALID_TYPE);
            return None;
        }
        Some(parsed)
    }

    /// Coerced number that must be present and strictly positive.
    pub fn required_positive(
        &mut self,
        key: &str,
        label: &str,
        required: &'static str,
        not_positive: &'static str,
    ) -> Option<f64> {
        match self.number(key, label) {
            Some(Some(n)) => self.check_positive(key, n, not_positive),
            Some(None) => {
                self.issue(key, required, code::INVALID_TYPE);
                None
            }
            None => {
                if !self.has_issue_at(key) {
                    self.issue(key, required, code::INVALID_TYPE);
                }
                None
            }
        }
    }

    /// Coerced positive number where `null`/`""` clears the field.
    pub fn nullable_positive(
        &mut self,
        key: &str,
        label: &str,
        not_positive: &'static str,
    ) -> Option<Option<f64>> {
        match self.number(key, label)? {
            None => Some(None),
            Some(n) => self.check_positive(key, n, not_positive).map(Some),
        }
    }

    fn check_positive(&mut self, key: &str, n: f64, message: &'static str) -> Option<f64> {
        if n > 0.0 {
            Some(n)
        } else {
            self.issue(key, message, code::TOO_SMALL);
            None
        }
    }

    fn check_int(&mut self, key: &str, n: f64, range: IntRange) -> Option<i64> {
        if n.fract() != 0.0 {
            self.issue(
                key,
                format!("{} deve ser um número inteiro", range.label),
                code::INVALID_TYPE,
            );
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let int = n as i64;
        if int < range.min {
            self.issue(key, range.message, code::TOO_SMALL);
            return None;
        }
        if int > range.max {
            self.issue(key, range.message, code::TOO_BIG);
            return None;
        }
        Some(int)
    }

    /// Coerced integer within `range`; `null`/`""` clears the field.
    pub fn nullable_int(&mut self, key: &str, range: IntRange) -> Option<Option<i64>> {
        match self.number(key, range.label)? {
            None => Some(None),
            Some(n) => self.check_int(key, n, range).map(Some),
        }
    }

    /// Coerced integer within `range`; `null`/`""` count as not provided.
    pub fn optional_int(&mut self, key: &str, range: IntRange) -> Option<i64> {
        self.nullable_int(key, range).flatten()
    }

    // -- enums, booleans ----------------------------------------------------

    /// A value deserialized from its string form; rejects anything else with `message`.
    pub fn enumeration<T: DeserializeOwned>(&mut self, key: &str, message: &str) -> Option<T> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => None,
            Slot::Present(value) => match serde_json::from_value::<T>(value.clone()) {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    self.issue(key, message, code::INVALID_ENUM);
                    None
                }
            },
        }
    }

    pub fn required_enumeration<T: DeserializeOwned>(
        &mut self,
        key: &str,
        message: &str,
    ) -> Option<T> {
        if !self.contains(key) || matches!(self.slot(key), Slot::Null) {
            self.issue(key, message, code::INVALID_TYPE);
            return None;
        }
        self.enumeration(key, message)
    }

    /// Boolean, also accepting the query-string forms `"true"` and `"false"`.
    pub fn boolean(&mut self, key: &str, label: &str) -> Option<bool> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => None,
            Slot::Present(Value::Bool(b)) => Some(*b),
            Slot::Present(Value::String(s)) if s == "true" => Some(true),
            Slot::Present(Value::String(s)) if s == "false" => Some(false),
            Slot::Present(_) => {
                self.issue(key, format!("{label} deve ser verdadeiro ou falso"), code::INVALID_TYPE);
                None
            }
        }
    }

    // -- calendar -----------------------------------------------------------

    fn date_string(&mut self, key: &str) -> Option<&'a str> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => None,
            Slot::Present(Value::String(s)) if s.trim().is_empty() => None,
            Slot::Present(Value::String(s)) => Some(s.as_str()),
            Slot::Present(_) => {
                self.issue(key, dates::INVALID_DAY, code::INVALID_TYPE);
                None
            }
        }
    }

    /// `YYYY-MM-DD` day, validated by calendar round-trip.
    pub fn day(&mut self, key: &str) -> Option<NaiveDate> {
        let s = self.date_string(key)?;
        match dates::parse_day(s.trim()) {
            Ok(day) => Some(day),
            Err(message) => {
                self.issue(key, message, code::INVALID_DATE);
                None
            }
        }
    }

    /// `YYYY-MM` month with the month component in `1..=12`.
    pub fn month(&mut self, key: &str) -> Option<String> {
        let s = self.date_string(key)?.trim();
        match dates::parse_month(s) {
            Ok(_) => Some(s.to_string()),
            Err(message) => {
                self.issue(key, message, code::INVALID_DATE);
                None
            }
        }
    }

    /// RFC 3339 instant or bare day.
    pub fn datetime(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let s = self.date_string(key)?;
        match dates::parse_datetime(s.trim()) {
            Ok(dt) => Some(dt),
            Err(message) => {
                self.issue(key, message, code::INVALID_DATE);
                None
            }
        }
    }

    // -- collections --------------------------------------------------------

    /// Array under `key`; anything else but absent/null is an issue.
    pub fn array(&mut self, key: &str, label: &str) -> Option<&'a Vec<Value>> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => None,
            Slot::Present(Value::Array(items)) => Some(items),
            Slot::Present(_) => {
                self.issue(key, format!("{label} deve ser uma lista"), code::INVALID_TYPE);
                None
            }
        }
    }

    /// Child-reader prefix for element `index` of the array under `key`.
    pub fn element_prefix(&self, key: &str, index: usize) -> String {
        format!("{}.{index}.", self.path(key))
    }

    /// List of trimmed, non-blank strings from an array or a comma-separated string.
    pub fn string_list(&mut self, key: &str, label: &str) -> Option<Vec<String>> {
        match self.slot(key) {
            Slot::Absent | Slot::Null => None,
            Slot::Present(Value::String(s)) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            Slot::Present(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item.as_str().map(str::trim) {
                        Some(s) if !s.is_empty() => out.push(s.to_string()),
                        _ => {
                            let path = format!("{key}.{index}");
                            self.issue(
                                &path,
                                format!("{label} deve conter apenas textos"),
                                code::INVALID_TYPE,
                            );
                        }
                    }
                }
                Some(out)
            }
            Slot::Present(_) => {
                self.issue(key, format!("{label} deve ser uma lista"), code::INVALID_TYPE);
                None
            }
        }
    }
}
