//! E-mail normalization and format check.
//!
//! Invites are stored with the normalized form and matched against the
//! normalized signup e-mail, so both sides must go through [`normalize_email`].

use validator::ValidateEmail;

use crate::fields::{Fields, Text, code};

pub const EMAIL_REQUIRED: &str = "E-mail é obrigatório";
pub const EMAIL_INVALID: &str = "E-mail inválido";
pub const EMAIL_MAX_LEN: usize = 255;

/// Trim and lower-case an e-mail address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

impl Fields<'_> {
    /// Required e-mail, normalized before the format check.
    pub fn email(&mut self, key: &str) -> Option<String> {
        let raw = self.required_text(key, Text::new("E-mail", EMAIL_REQUIRED, EMAIL_MAX_LEN))?;
        let email = normalize_email(&raw);
        if is_valid_email(&email) {
            Some(email)
        } else {
            self.issue(key, EMAIL_INVALID, code::INVALID_STRING);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("  Maria@Example.COM ", "maria@example.com")]
    #[case("joao@example.com", "joao@example.com")]
    #[case("\tANA@x.io\n", "ana@x.io")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_email(input), expected);
    }

    #[test]
    fn field_reader_normalizes_and_checks() {
        let input = json!({ "ok": " Maria@Example.com ", "bad": "maria@", "empty": "" });
        let mut fields = Fields::new(&input);
        assert_eq!(fields.email("ok").as_deref(), Some("maria@example.com"));
        assert_eq!(fields.email("bad"), None);
        assert_eq!(fields.email("empty"), None);
        let failure = fields.finish(()).unwrap_err();
        assert_eq!(failure.messages_at("bad"), vec![EMAIL_INVALID]);
        assert_eq!(failure.messages_at("empty"), vec![EMAIL_REQUIRED]);
    }
}
