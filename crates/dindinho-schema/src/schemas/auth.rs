//! Signup and login payloads.
//!
//! Passwords are taken verbatim: no trimming, length counted in characters.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationFailure;
use crate::fields::{Fields, Text, code};

const NAME: Text = Text::new("Nome", "Nome é obrigatório", 80).min(2);

pub const PASSWORD_REQUIRED: &str = "Senha é obrigatória";
pub const PASSWORD_TOO_SHORT: &str = "Senha deve ter pelo menos 8 caracteres";
pub const PASSWORD_TOO_LONG: &str = "Senha deve ter no máximo 128 caracteres";
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;

impl Fields<'_> {
    fn password(&mut self, key: &str, enforce_policy: bool) -> Option<String> {
        let Some(password) = self.raw(key).and_then(Value::as_str) else {
            self.issue(key, PASSWORD_REQUIRED, code::INVALID_TYPE);
            return None;
        };
        let len = password.chars().count();
        if len == 0 {
            self.issue(key, PASSWORD_REQUIRED, code::TOO_SMALL);
            return None;
        }
        if enforce_policy && len < PASSWORD_MIN_LEN {
            self.issue(key, PASSWORD_TOO_SHORT, code::TOO_SMALL);
            return None;
        }
        if len > PASSWORD_MAX_LEN {
            self.issue(key, PASSWORD_TOO_LONG, code::TOO_BIG);
            return None;
        }
        Some(password.to_string())
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl std::fmt::Debug for SignupInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupInput")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SignupInput {
    /// Parse a signup payload. The e-mail comes back normalized.
    ///
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let name = f.required_text("name", NAME);
        let email = f.email("email");
        let password = f.password("password", true);

        let value = match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Some(Self {
                name,
                email,
                password,
            }),
            _ => None,
        };
        f.finish_some(value)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginInput {
    /// Parse a login payload. Only presence is checked on the password so
    /// accounts created under an older policy can still sign in.
    ///
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let email = f.email("email");
        let password = f.password("password", false);
        let value = email
            .zip(password)
            .map(|(email, password)| Self { email, password });
        f.finish_some(value)
    }
}
