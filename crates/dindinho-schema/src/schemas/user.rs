//! Profile update payload.

use serde::Serialize;
use serde_json::Value;

use super::require_any_field;
use crate::error::ValidationFailure;
use crate::fields::{Fields, Text};

const NAME: Text = Text::new("Nome", "Nome é obrigatório", 80).min(2);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Normalized when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateUser {
    /// # Errors
    ///
    /// Field issues, or [`super::AT_LEAST_ONE_FIELD`] when nothing was sent.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let name = f.optional_text("name", NAME);
        let email = if f.contains("email") { f.email("email") } else { None };
        let update = Self { name, email };
        require_any_field(&mut f, update == Self::default());
        f.finish(update)
    }
}
