//! Invite creation and response payloads.

use std::collections::HashSet;

use dindinho_core::entities::InviteAccount;
use dindinho_core::enums::Permission;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::narrow;
use crate::error::ValidationFailure;
use crate::fields::{Fields, IntRange, code};

const ACCOUNT_REQUIRED: &str = "Conta é obrigatória";
const PERMISSION_INVALID: &str = "Permissão inválida";
const DECISION_INVALID: &str = "Ação inválida";

pub const ACCOUNTS_REQUIRED: &str = "Selecione ao menos uma conta";
pub const ACCOUNT_REPEATED: &str = "Conta repetida no convite";
pub const MAX_INVITE_ACCOUNTS: usize = 50;

const EXPIRES_IN_DAYS: IntRange = IntRange {
    label: "Validade",
    min: 1,
    max: 30,
    message: "Validade deve estar entre 1 e 30 dias",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvite {
    /// Normalized recipient e-mail.
    pub email: String,
    pub accounts: Vec<InviteAccount>,
    /// Falls back to the configured default lifetime when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<u32>,
}

impl CreateInvite {
    /// Parse an invite. Each account may appear once; `permission` defaults to `VIEWER`.
    ///
    /// # Errors
    ///
    /// Returns every field issue found, with element paths like `accounts.1.permission`.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let email = f.email("email");
        let expires_in_days = narrow(f.optional_int("expiresInDays", EXPIRES_IN_DAYS));

        let mut accounts = Vec::new();
        match f.array("accounts", "Contas") {
            None if !f.has_issue_at("accounts") => {
                f.issue("accounts", ACCOUNTS_REQUIRED, code::INVALID_TYPE);
            }
            None => {}
            Some(items) if items.is_empty() => {
                f.issue("accounts", ACCOUNTS_REQUIRED, code::TOO_SMALL);
            }
            Some(items) if items.len() > MAX_INVITE_ACCOUNTS => {
                f.issue(
                    "accounts",
                    format!("Convite pode ter no máximo {MAX_INVITE_ACCOUNTS} contas"),
                    code::TOO_BIG,
                );
            }
            Some(items) => {
                let mut seen = HashSet::new();
                for (index, item) in items.iter().enumerate() {
                    let prefix = f.element_prefix("accounts", index);
                    let mut nested = Fields::nested(item, &prefix);
                    let account_id = nested.required_id("accountId", ACCOUNT_REQUIRED);
                    let permission = nested
                        .enumeration::<Permission>("permission", PERMISSION_INVALID)
                        .unwrap_or(Permission::Viewer);
                    if let Some(id) = &account_id
                        && !seen.insert(id.clone())
                    {
                        nested.issue("accountId", ACCOUNT_REPEATED, code::CUSTOM);
                    }
                    f.absorb(nested);
                    if let Some(account_id) = account_id {
                        accounts.push(InviteAccount {
                            account_id,
                            permission,
                        });
                    }
                }
            }
        }

        f.finish_some(email.map(|email| Self {
            email,
            accounts,
            expires_in_days,
        }))
    }
}

/// What the invited user decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RespondInvite {
    pub action: InviteDecision,
}

impl RespondInvite {
    /// # Errors
    ///
    /// An issue at `action` unless it is `ACCEPT` or `REJECT`.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let action = f.required_enumeration("action", DECISION_INVALID);
        f.finish_some(action.map(|action| Self { action }))
    }
}
