//! Invite auto-link: turn pending invites into account grants.
//!
//! When someone signs up, every pending and unexpired invite addressed to
//! their e-mail is accepted, and each account it shares is granted to the new
//! user with one audit entry per grant. The same linking runs when an existing
//! user accepts a single invite explicitly.
//!
//! The workflow talks to storage through [`InviteLinkStore`] so it can run
//! against the libSQL service, inside a caller's transaction, or against an
//! in-memory fake.

use chrono::{DateTime, Utc};
use dindinho_core::audit_detail::AutoLinkInviteDetail;
use dindinho_core::entities::{AccountAccess, Invite};
use dindinho_core::enums::{AuditAction, Permission, ResourceType};
use dindinho_core::responses::AutoLinkOutcome;
use dindinho_schema::normalize_email;

use crate::error::DatabaseError;
use crate::helpers::now;
use crate::repos::audit::AuditRecord;
use crate::repos::invite::ensure_open;
use crate::service::{DbTransaction, DindinhoService};

/// Storage operations the auto-link workflow needs.
#[allow(async_fn_in_trait)]
pub trait InviteLinkStore {
    /// Pending invites for an already normalized e-mail, unexpired at `now`.
    async fn find_pending_invites(&self, email: &str, now: DateTime<Utc>) -> Result<Vec<Invite>, DatabaseError>;

    async fn mark_invite_accepted(&self, invite_id: &str, now: DateTime<Utc>) -> Result<(), DatabaseError>;

    /// Create the grant or overwrite the permission of an existing one.
    async fn upsert_account_access(&self, grant: &AccountAccess) -> Result<(), DatabaseError>;

    async fn append_audit(&self, record: &AuditRecord) -> Result<(), DatabaseError>;
}

/// [`InviteLinkStore`] over the libSQL service, optionally bound to a transaction.
pub struct SqlInviteStore<'a> {
    service: &'a DindinhoService,
    tx: Option<&'a DbTransaction>,
}

impl<'a> SqlInviteStore<'a> {
    #[must_use]
    pub const fn new(service: &'a DindinhoService, tx: Option<&'a DbTransaction>) -> Self {
        Self { service, tx }
    }
}

impl InviteLinkStore for SqlInviteStore<'_> {
    async fn find_pending_invites(&self, email: &str, now: DateTime<Utc>) -> Result<Vec<Invite>, DatabaseError> {
        self.service.find_pending_invites(email, now, self.tx).await
    }

    async fn mark_invite_accepted(&self, invite_id: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.service.mark_invite_accepted(invite_id, now, self.tx).await
    }

    async fn upsert_account_access(&self, grant: &AccountAccess) -> Result<(), DatabaseError> {
        self.service.upsert_account_access(grant, self.tx).await
    }

    async fn append_audit(&self, record: &AuditRecord) -> Result<(), DatabaseError> {
        self.service.append_audit(record, self.tx).await.map(|_| ())
    }
}

/// Which audit shape a link writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkReason {
    Signup,
    Accepted,
}

impl LinkReason {
    const fn action(self) -> AuditAction {
        match self {
            Self::Signup => AuditAction::AutoLinkInvite,
            Self::Accepted => AuditAction::InviteAccepted,
        }
    }

    fn detail(self, invite: &Invite, permission: Permission) -> AutoLinkInviteDetail {
        match self {
            Self::Signup => AutoLinkInviteDetail::signup(&invite.id, permission),
            Self::Accepted => AutoLinkInviteDetail::accepted(&invite.id, permission),
        }
    }
}

/// Accept one invite for `user_id`: status first, then one grant and one
/// audit entry per shared account.
async fn link_invite<S: InviteLinkStore>(
    store: &S,
    invite: &Invite,
    user_id: &str,
    now: DateTime<Utc>,
    reason: LinkReason,
    outcome: &mut AutoLinkOutcome,
) -> Result<(), DatabaseError> {
    store.mark_invite_accepted(&invite.id, now).await?;
    outcome.accepted_invites.push(invite.id.clone());
    tracing::info!(invite_id = %invite.id, user_id, accounts = invite.accounts.len(), "invite accepted");

    for account in &invite.accounts {
        store
            .upsert_account_access(&AccountAccess {
                account_id: account.account_id.clone(),
                user_id: user_id.to_string(),
                permission: account.permission,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let record = AuditRecord::new(user_id, reason.action(), ResourceType::Account, account.account_id.as_str())
            .with_details(&reason.detail(invite, account.permission))?;
        store.append_audit(&record).await?;

        outcome.granted_accounts.push(account.account_id.clone());
        tracing::debug!(
            invite_id = %invite.id,
            account_id = %account.account_id,
            permission = %account.permission,
            "account access granted"
        );
    }
    Ok(())
}

/// Accept every pending, unexpired invite addressed to `email` and grant its
/// accounts to `user_id`.
///
/// Nothing is written when no invite matches. Errors from the store are
/// returned as they are; earlier writes are only undone if the store is bound
/// to a transaction the caller rolls back.
///
/// # Errors
///
/// The first `DatabaseError` raised by the store.
pub async fn process_pending_invites<S: InviteLinkStore>(
    store: &S,
    user_id: &str,
    email: &str,
    now: DateTime<Utc>,
) -> Result<AutoLinkOutcome, DatabaseError> {
    let email = normalize_email(email);
    let invites = store.find_pending_invites(&email, now).await?;

    let mut outcome = AutoLinkOutcome::default();
    if invites.is_empty() {
        tracing::debug!(user_id, "no pending invites to link");
        return Ok(outcome);
    }

    for invite in &invites {
        link_invite(store, invite, user_id, now, LinkReason::Signup, &mut outcome).await?;
    }

    tracing::info!(
        user_id,
        invites = outcome.accepted_invites.len(),
        grants = outcome.granted_accounts.len(),
        "pending invites linked"
    );
    Ok(outcome)
}

impl DindinhoService {
    /// Run the signup auto-link for a new user.
    ///
    /// With `tx`, every read and write goes through it and the caller decides
    /// whether to commit. Without it each write commits on its own.
    ///
    /// # Errors
    ///
    /// Returns the first `DatabaseError` encountered.
    pub async fn process_pending_invites(
        &self,
        user_id: &str,
        email: &str,
        tx: Option<&DbTransaction>,
    ) -> Result<AutoLinkOutcome, DatabaseError> {
        process_pending_invites(&SqlInviteStore::new(self, tx), user_id, email, now()).await
    }

    /// Accept one invite explicitly on behalf of an existing user.
    ///
    /// The invite must be addressed to `email` (an invite for someone else is
    /// reported as missing) and must still be open.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NoResult` for an unknown or foreign invite,
    /// `DatabaseError::InvalidState` if it is closed or expired.
    pub async fn accept_invite(
        &self,
        invite_id: &str,
        user_id: &str,
        email: &str,
    ) -> Result<AutoLinkOutcome, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let invite = self.get_invite(invite_id, Some(&tx)).await?;
            if normalize_email(&invite.email) != normalize_email(email) {
                return Err(DatabaseError::NoResult);
            }
            let now = now();
            ensure_open(&invite, now)?;

            let mut outcome = AutoLinkOutcome::default();
            let store = SqlInviteStore::new(self, Some(&tx));
            link_invite(&store, &invite, user_id, now, LinkReason::Accepted, &mut outcome).await?;
            Ok::<AutoLinkOutcome, DatabaseError>(outcome)
        }
        .await;
        Self::settle(tx, result).await
    }
}
