//! Account create/update payloads.

use dindinho_core::enums::AccountType;
use serde::Serialize;
use serde_json::Value;

use super::{DAY_OF_MONTH, narrow, narrow_nullable, require_any_field};
use crate::error::ValidationFailure;
use crate::fields::{Fields, IntRange, Text, code};

const NAME: Text = Text::new("Nome", "Nome é obrigatório", 60);
const BRAND: Text = Text::new("Bandeira", "Bandeira inválida", 40);
const COLOR: Text = Text::new("Cor", "Cor inválida", 20);
const ICON: Text = Text::new("Ícone", "Ícone inválido", 40);
const TYPE_INVALID: &str = "Tipo de conta inválido";
const LIMIT_POSITIVE: &str = "Limite deve ser maior que zero";

pub const CLOSING_DAY_REQUIRED: &str = "Dia de fechamento é obrigatório para cartão de crédito";
pub const DUE_DAY_REQUIRED: &str = "Dia de vencimento é obrigatório para cartão de crédito";

const CLOSING_DAY: IntRange = IntRange {
    label: "Dia de fechamento",
    message: "Dia de fechamento deve estar entre 1 e 31",
    ..DAY_OF_MONTH
};

const DUE_DAY: IntRange = IntRange {
    label: "Dia de vencimento",
    message: "Dia de vencimento deve estar entre 1 e 31",
    ..DAY_OF_MONTH
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_day: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl CreateAccount {
    /// Parse a create payload. `type` defaults to `STANDARD`; credit accounts
    /// must name their closing and due days.
    ///
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);

        let name = f.required_text("name", NAME);
        let account_type = f
            .enumeration::<AccountType>("type", TYPE_INVALID)
            .unwrap_or(AccountType::Standard);
        let color = f.nullable_text("color", COLOR).flatten();
        let icon = f.nullable_text("icon", ICON).flatten();
        let closing_day = narrow(f.optional_int("closingDay", CLOSING_DAY));
        let due_day = narrow(f.optional_int("dueDay", DUE_DAY));
        let limit = f.nullable_positive("limit", "Limite", LIMIT_POSITIVE).flatten();
        let brand = f.nullable_text("brand", BRAND).flatten();

        if account_type == AccountType::Credit {
            if closing_day.is_none() && !f.has_issue_at("closingDay") {
                f.issue("closingDay", CLOSING_DAY_REQUIRED, code::INVALID_TYPE);
            }
            if due_day.is_none() && !f.has_issue_at("dueDay") {
                f.issue("dueDay", DUE_DAY_REQUIRED, code::INVALID_TYPE);
            }
        }

        f.finish_some(name.map(|name| Self {
            name,
            account_type,
            color,
            icon,
            closing_day,
            due_day,
            limit,
            brand,
        }))
    }
}

/// Partial account update.
///
/// `Some(None)` on a nullable field means "clear it" and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_day: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_day: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Option<String>>,
}

impl UpdateAccount {
    /// Parse a partial update.
    ///
    /// # Errors
    ///
    /// Field issues, or [`super::AT_LEAST_ONE_FIELD`] when nothing was sent.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);

        let update = Self {
            name: f.optional_text("name", NAME),
            account_type: f.enumeration("type", TYPE_INVALID),
            color: f.nullable_text("color", COLOR),
            icon: f.nullable_text("icon", ICON),
            closing_day: narrow_nullable(f.nullable_int("closingDay", CLOSING_DAY)),
            due_day: narrow_nullable(f.nullable_int("dueDay", DUE_DAY)),
            limit: f.nullable_positive("limit", "Limite", LIMIT_POSITIVE),
            brand: f.nullable_text("brand", BRAND),
        };

        require_any_field(&mut f, update.is_empty());
        f.finish(update)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Wire names of the fields this update touches, in declaration order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("type", self.account_type.is_some()),
            ("color", self.color.is_some()),
            ("icon", self.icon.is_some()),
            ("closingDay", self.closing_day.is_some()),
            ("dueDay", self.due_day.is_some()),
            ("limit", self.limit.is_some()),
            ("brand", self.brand.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}
