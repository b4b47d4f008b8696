//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `details` JSON blob. These types
//! give the common shapes a schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Permission;

/// Reason recorded when onboarding grants access from a pending invite.
pub const SIGNUP_AUTO_LINK_REASON: &str = "signup_auto_link";

/// Reason recorded when an existing user accepts an invite explicitly.
pub const INVITE_ACCEPTED_REASON: &str = "invite_accepted";

/// Detail for `AuditAction::AutoLinkInvite` and `AuditAction::InviteAccepted`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoLinkInviteDetail {
    pub invite_id: String,
    pub permission: Permission,
    pub reason: String,
}

impl AutoLinkInviteDetail {
    #[must_use]
    pub fn signup(invite_id: &str, permission: Permission) -> Self {
        Self {
            invite_id: invite_id.to_string(),
            permission,
            reason: SIGNUP_AUTO_LINK_REASON.to_string(),
        }
    }

    #[must_use]
    pub fn accepted(invite_id: &str, permission: Permission) -> Self {
        Self {
            invite_id: invite_id.to_string(),
            permission,
            reason: INVITE_ACCEPTED_REASON.to_string(),
        }
    }
}

/// Detail for `AuditAction::InviteCreated`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InviteCreatedDetail {
    pub email: String,
    pub account_ids: Vec<String>,
}

/// Detail for `AuditAction::AccountUpdated`: the camelCase names of changed fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdatedDetail {
    pub fields: Vec<String>,
}
