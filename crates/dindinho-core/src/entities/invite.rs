use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{InviteStatus, Permission};

/// An offer of access to one or more accounts, addressed to an email.
///
/// `email` is stored trimmed and lower-cased; it is the match key when the
/// invited person signs up.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: String,
    pub sender_id: String,
    pub email: String,
    pub status: InviteStatus,
    pub expires_at: DateTime<Utc>,
    pub accounts: Vec<InviteAccount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invite {
    /// Pending and not yet past its expiry.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Pending && self.expires_at > now
    }
}

/// One account referenced by an invite, with the permission it grants.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InviteAccount {
    pub account_id: String,
    pub permission: Permission,
}
