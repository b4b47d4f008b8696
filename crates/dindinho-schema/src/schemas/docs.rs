//! Front matter of the in-app help pages.
//!
//! The docs loader hands over the already-parsed YAML header as JSON.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::narrow;
use crate::error::ValidationFailure;
use crate::fields::{Fields, IntRange, Text};

const TITLE: Text = Text::new("Título", "Título é obrigatório", 120);
const DESCRIPTION: Text = Text::new("Descrição", "Descrição inválida", 300);
const SECTION: Text = Text::new("Seção", "Seção inválida", 60);

const ORDER: IntRange = IntRange {
    label: "Ordem",
    min: 0,
    max: 9999,
    message: "Ordem deve estar entre 0 e 9999",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocFrontmatter {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    pub tags: Vec<String>,
    pub draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDate>,
}

impl DocFrontmatter {
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let title = f.required_text("title", TITLE);
        let description = f.nullable_text("description", DESCRIPTION).flatten();
        let section = f.nullable_text("section", SECTION).flatten();
        let order = narrow(f.optional_int("order", ORDER));
        let tags = f.string_list("tags", "Tags").unwrap_or_default();
        let draft = f.boolean("draft", "Rascunho").unwrap_or(false);
        let updated_at = f.day("updatedAt");

        f.finish_some(title.map(|title| Self {
            title,
            description,
            section,
            order,
            tags,
            draft,
            updated_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_with_defaults() {
        let doc = DocFrontmatter::parse(&json!({ "title": " Primeiros passos ", "order": "2" })).unwrap();
        assert_eq!(doc.title, "Primeiros passos");
        assert_eq!(doc.order, Some(2));
        assert!(doc.tags.is_empty());
        assert!(!doc.draft);
    }

    #[test]
    fn tags_from_comma_list() {
        let doc = DocFrontmatter::parse(&json!({ "title": "Cartões", "tags": "credito, fatura" })).unwrap();
        assert_eq!(doc.tags, vec!["credito".to_string(), "fatura".to_string()]);
    }

    #[test]
    fn missing_title_and_bad_date() {
        let failure = DocFrontmatter::parse(&json!({ "updatedAt": "2024-02-30" })).unwrap_err();
        assert_eq!(failure.messages_at("title"), vec!["Título é obrigatório"]);
        assert_eq!(failure.messages_at("updatedAt"), vec!["Data inválida"]);
    }
}
