//! Product backlog entries kept alongside the docs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationFailure;
use crate::fields::{Fields, Text, code};

const TITLE: Text = Text::new("Título", "Título é obrigatório", 160);
const AREA: Text = Text::new("Área", "Área inválida", 40);
const STATUS_INVALID: &str = "Status inválido";
const PRIORITY_INVALID: &str = "Prioridade inválida";

pub const ID_INVALID: &str = "Identificador deve seguir o formato DIN-123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BacklogStatus {
    Todo,
    InProgress,
    Blocked,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BacklogPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    pub id: String,
    pub title: String,
    pub status: BacklogStatus,
    pub priority: BacklogPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
}

/// `DIN-` followed by one or more digits.
fn is_backlog_id(id: &str) -> bool {
    id.strip_prefix("DIN-")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

impl BacklogItem {
    /// Status defaults to `TODO` and priority to `MEDIUM`.
    ///
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let id = f.required_id("id", ID_INVALID);
        if let Some(id) = &id
            && !is_backlog_id(id)
        {
            f.issue("id", ID_INVALID, code::INVALID_STRING);
        }
        let title = f.required_text("title", TITLE);
        let status = f
            .enumeration("status", STATUS_INVALID)
            .unwrap_or(BacklogStatus::Todo);
        let priority = f
            .enumeration("priority", PRIORITY_INVALID)
            .unwrap_or(BacklogPriority::Medium);
        let area = f.nullable_text("area", AREA).flatten();
        let tags = f.string_list("tags", "Tags").unwrap_or_default();
        let created = f.day("created");

        let value = id.zip(title).map(|(id, title)| Self {
            id,
            title,
            status,
            priority,
            area,
            tags,
            created,
        });
        f.finish_some(value)
    }
}
