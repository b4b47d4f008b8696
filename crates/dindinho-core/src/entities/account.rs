use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AccountType;

/// A bank account or credit card. Billing fields are only set on credit accounts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub closing_day: Option<u8>,
    pub due_day: Option<u8>,
    pub limit: Option<f64>,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
