//! Status enums, permissions, account and transaction kinds, and audit actions.
//!
//! All enums serialize as `SCREAMING_SNAKE_CASE`, which is also the string
//! stored in SQL. Status enums with state machines provide
//! `allowed_next_states()` to enforce valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `Display` by delegating to `as_str()`.
macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// InviteStatus
// ---------------------------------------------------------------------------

/// Lifecycle of an invite.
///
/// ```text
/// PENDING → ACCEPTED
///         → REJECTED
///         → EXPIRED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl InviteStatus {
    pub const ALL: &'static [Self] = &[Self::Pending, Self::Accepted, Self::Rejected, Self::Expired];

    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Rejected, Self::Expired],
            Self::Accepted | Self::Rejected | Self::Expired => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// Access level a user holds on an account.
///
/// Ordered from least to most privileged, so `Permission::Editor >= Permission::Viewer`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Viewer,
    Editor,
    Owner,
}

impl Permission {
    pub const ALL: &'static [Self] = &[Self::Viewer, Self::Editor, Self::Owner];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "VIEWER",
            Self::Editor => "EDITOR",
            Self::Owner => "OWNER",
        }
    }

    /// Whether this level allows changing the account or its transactions.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Editor | Self::Owner)
    }
}

// ---------------------------------------------------------------------------
// AccountType
// ---------------------------------------------------------------------------

/// Kind of account. Credit accounts carry billing-cycle fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Standard,
    Credit,
}

impl AccountType {
    pub const ALL: &'static [Self] = &[Self::Standard, Self::Credit];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Credit => "CREDIT",
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub const ALL: &'static [Self] = &[Self::Income, Self::Expense, Self::Transfer];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    AutoLinkInvite,
    InviteCreated,
    InviteAccepted,
    InviteRejected,
    InviteExpired,
    AccountCreated,
    AccountUpdated,
    UserSignup,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoLinkInvite => "AUTO_LINK_INVITE",
            Self::InviteCreated => "INVITE_CREATED",
            Self::InviteAccepted => "INVITE_ACCEPTED",
            Self::InviteRejected => "INVITE_REJECTED",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::AccountCreated => "ACCOUNT_CREATED",
            Self::AccountUpdated => "ACCOUNT_UPDATED",
            Self::UserSignup => "USER_SIGNUP",
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// Kind of resource an audit entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Account,
    Invite,
    User,
}

impl ResourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "ACCOUNT",
            Self::Invite => "INVITE",
            Self::User => "USER",
        }
    }
}

display_as_str!(
    InviteStatus,
    Permission,
    AccountType,
    TransactionType,
    AuditAction,
    ResourceType,
);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
