//! Invite repository.
//!
//! An invite names a recipient e-mail and the accounts it shares. It starts
//! `PENDING` and moves at most once, to `ACCEPTED`, `REJECTED` or `EXPIRED`.

use chrono::{DateTime, Utc};
use dindinho_core::audit_detail::InviteCreatedDetail;
use dindinho_core::entities::{Invite, InviteAccount};
use dindinho_core::enums::{AuditAction, InviteStatus, ResourceType};
use dindinho_core::ids::PREFIX_INVITE;
use dindinho_schema::normalize_email;
use dindinho_schema::schemas::invite::CreateInvite;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{now, parse_datetime, parse_enum, timestamp};
use crate::repos::audit::AuditRecord;
use crate::service::{DbTransaction, DindinhoService};

pub const INVITE_NOT_PENDING: &str = "Convite não está mais pendente";
pub const INVITE_EXPIRED: &str = "Convite expirado";

const INVITE_COLUMNS: &str = "id, sender_id, email, status, expires_at, created_at, updated_at";

/// Invite row without its account list.
fn row_to_invite(row: &libsql::Row) -> Result<Invite, DatabaseError> {
    Ok(Invite {
        id: row.get::<String>(0)?,
        sender_id: row.get::<String>(1)?,
        email: row.get::<String>(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        expires_at: parse_datetime(&row.get::<String>(4)?)?,
        accounts: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn collect_invites(
    conn: &libsql::Connection,
    mut rows: libsql::Rows,
) -> Result<Vec<Invite>, DatabaseError> {
    let mut invites = Vec::new();
    while let Some(row) = rows.next().await? {
        invites.push(row_to_invite(&row)?);
    }
    drop(rows);
    for invite in &mut invites {
        invite.accounts = load_invite_accounts(conn, &invite.id).await?;
    }
    Ok(invites)
}

async fn load_invite_accounts(
    conn: &libsql::Connection,
    invite_id: &str,
) -> Result<Vec<InviteAccount>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT account_id, permission FROM invite_accounts WHERE invite_id = ?1 ORDER BY rowid",
            [invite_id],
        )
        .await?;
    let mut accounts = Vec::new();
    while let Some(row) = rows.next().await? {
        accounts.push(InviteAccount {
            account_id: row.get::<String>(0)?,
            permission: parse_enum(&row.get::<String>(1)?)?,
        });
    }
    Ok(accounts)
}

impl DindinhoService {
    /// Persist an invite with its account list and audit it, atomically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails (e.g. unknown account id).
    pub async fn create_invite(
        &self,
        sender_id: &str,
        input: &CreateInvite,
        expires_at: DateTime<Utc>,
    ) -> Result<Invite, DatabaseError> {
        let tx = self.begin().await?;
        let result = self.insert_invite(sender_id, input, expires_at, &tx).await;
        Self::settle(tx, result).await
    }

    async fn insert_invite(
        &self,
        sender_id: &str,
        input: &CreateInvite,
        expires_at: DateTime<Utc>,
        tx: &DbTransaction,
    ) -> Result<Invite, DatabaseError> {
        let now = now();
        let id = generate_id(tx, PREFIX_INVITE).await?;
        let email = normalize_email(&input.email);

        tx.execute(
            "INSERT INTO invites (id, sender_id, email, status, expires_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            libsql::params![
                id.as_str(),
                sender_id,
                email.as_str(),
                InviteStatus::Pending.as_str(),
                timestamp(expires_at),
                timestamp(now)
            ],
        )
        .await?;

        for account in &input.accounts {
            tx.execute(
                "INSERT INTO invite_accounts (invite_id, account_id, permission) VALUES (?1, ?2, ?3)",
                [id.as_str(), account.account_id.as_str(), account.permission.as_str()],
            )
            .await?;
        }

        let detail = InviteCreatedDetail {
            email: email.clone(),
            account_ids: input.accounts.iter().map(|a| a.account_id.clone()).collect(),
        };
        self.append_audit(
            &AuditRecord::new(sender_id, AuditAction::InviteCreated, ResourceType::Invite, id.as_str())
                .with_details(&detail)?,
            Some(tx),
        )
        .await?;

        tracing::info!(invite_id = %id, sender_id, accounts = input.accounts.len(), "invite created");
        Ok(Invite {
            id,
            sender_id: sender_id.to_string(),
            email,
            status: InviteStatus::Pending,
            expires_at,
            accounts: input.accounts.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// `DatabaseError::NoResult` if the invite does not exist.
    pub async fn get_invite(
        &self,
        id: &str,
        tx: Option<&DbTransaction>,
    ) -> Result<Invite, DatabaseError> {
        let conn = self.executor(tx).await;
        let rows = conn
            .query(&format!("SELECT {INVITE_COLUMNS} FROM invites WHERE id = ?1"), [id])
            .await?;
        collect_invites(&conn, rows)
            .await?
            .pop()
            .ok_or(DatabaseError::NoResult)
    }

    /// Pending invites for `email` that have not expired at `now`.
    ///
    /// The e-mail comparison ignores case and surrounding whitespace on both
    /// sides. Each invite comes with its account list in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn find_pending_invites(
        &self,
        email: &str,
        now: DateTime<Utc>,
        tx: Option<&DbTransaction>,
    ) -> Result<Vec<Invite>, DatabaseError> {
        let conn = self.executor(tx).await;
        let email = normalize_email(email);
        let rows = conn
            .query(
                &format!(
                    "SELECT {INVITE_COLUMNS} FROM invites
                     WHERE lower(trim(email)) = ?1 AND status = ?2 AND expires_at > ?3
                     ORDER BY created_at, id"
                ),
                libsql::params![email.as_str(), InviteStatus::Pending.as_str(), timestamp(now)],
            )
            .await?;
        collect_invites(&conn, rows).await
    }

    /// Set an invite to `ACCEPTED`. Unconditional: callers decide eligibility.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the UPDATE fails.
    pub async fn mark_invite_accepted(
        &self,
        id: &str,
        now: DateTime<Utc>,
        tx: Option<&DbTransaction>,
    ) -> Result<(), DatabaseError> {
        self.executor(tx)
            .await
            .execute(
                "UPDATE invites SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![InviteStatus::Accepted.as_str(), timestamp(now), id],
            )
            .await?;
        Ok(())
    }

    /// Decline an open invite on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NoResult` for an unknown invite,
    /// `DatabaseError::InvalidState` if it is no longer pending or has expired.
    pub async fn reject_invite(&self, id: &str, user_id: &str) -> Result<Invite, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let mut invite = self.get_invite(id, Some(&tx)).await?;
            let now = now();
            ensure_open(&invite, now)?;

            tx.execute(
                "UPDATE invites SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![InviteStatus::Rejected.as_str(), timestamp(now), id],
            )
            .await?;
            self.append_audit(
                &AuditRecord::new(user_id, AuditAction::InviteRejected, ResourceType::Invite, id),
                Some(&tx),
            )
            .await?;

            invite.status = InviteStatus::Rejected;
            invite.updated_at = now;
            Ok::<Invite, DatabaseError>(invite)
        }
        .await;
        Self::settle(tx, result).await
    }

    /// Move every pending invite whose expiry has passed to `EXPIRED`.
    ///
    /// Each one is audited against its sender. Returns the affected ids.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a statement fails; nothing changes then.
    pub async fn expire_stale_invites(&self, now: DateTime<Utc>) -> Result<Vec<String>, DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let mut rows = tx
                .query(
                    "SELECT id, sender_id FROM invites WHERE status = ?1 AND expires_at <= ?2 ORDER BY id",
                    libsql::params![InviteStatus::Pending.as_str(), timestamp(now)],
                )
                .await?;
            let mut stale = Vec::new();
            while let Some(row) = rows.next().await? {
                stale.push((row.get::<String>(0)?, row.get::<String>(1)?));
            }
            drop(rows);

            for (id, sender_id) in &stale {
                tx.execute(
                    "UPDATE invites SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    libsql::params![InviteStatus::Expired.as_str(), timestamp(now), id.as_str()],
                )
                .await?;
                self.append_audit(
                    &AuditRecord::new(sender_id.as_str(), AuditAction::InviteExpired, ResourceType::Invite, id.as_str()),
                    Some(&tx),
                )
                .await?;
            }
            Ok::<Vec<String>, DatabaseError>(stale.into_iter().map(|(id, _)| id).collect())
        }
        .await;

        let expired = Self::settle(tx, result).await?;
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "expired stale invites");
        }
        Ok(expired)
    }

    /// Invites sent by `sender_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_sent_invites(&self, sender_id: &str) -> Result<Vec<Invite>, DatabaseError> {
        let conn = self.db().conn().await;
        let rows = conn
            .query(
                &format!(
                    "SELECT {INVITE_COLUMNS} FROM invites WHERE sender_id = ?1 ORDER BY created_at DESC, id"
                ),
                [sender_id],
            )
            .await?;
        collect_invites(&conn, rows).await
    }
}

/// Fail unless `invite` is pending and unexpired at `now`.
///
/// # Errors
///
/// `DatabaseError::InvalidState` naming why the invite is closed.
pub fn ensure_open(invite: &Invite, now: DateTime<Utc>) -> Result<(), DatabaseError> {
    if invite.status != InviteStatus::Pending {
        return Err(DatabaseError::InvalidState(INVITE_NOT_PENDING.to_string()));
    }
    if invite.expires_at <= now {
        return Err(DatabaseError::InvalidState(INVITE_EXPIRED.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{create_test_account, create_test_user, test_service};
    use chrono::Duration;
    use dindinho_core::entities::User;
    use dindinho_core::enums::Permission;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn setup(svc: &DindinhoService) -> (User, Vec<String>) {
        let sender = create_test_user(svc, "Dona", "dona@example.com").await;
        let a = create_test_account(svc, &sender.id, "Casa").await;
        let b = create_test_account(svc, &sender.id, "Viagem").await;
        (sender, vec![a.id, b.id])
    }

    fn invite_input(email: &str, account_ids: &[String]) -> CreateInvite {
        let accounts: Vec<_> = account_ids
            .iter()
            .map(|id| json!({ "accountId": id, "permission": "EDITOR" }))
            .collect();
        CreateInvite::parse(&json!({ "email": email, "accounts": accounts })).unwrap()
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let svc = test_service().await;
        let (sender, accounts) = setup(&svc).await;
        let expires = now() + Duration::days(7);
        let invite = svc
            .create_invite(&sender.id, &invite_input("Guest@Example.com", &accounts), expires)
            .await
            .unwrap();

        assert_eq!(invite.email, "guest@example.com");
        assert_eq!(invite.status, InviteStatus::Pending);
        let stored = svc.get_invite(&invite.id, None).await.unwrap();
        assert_eq!(stored, invite);
        assert_eq!(stored.accounts[0].permission, Permission::Editor);

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::InviteCreated),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit[0].details.as_ref().unwrap()["accountIds"], json!(accounts));
    }

    #[tokio::test]
    async fn unknown_account_rolls_back_invite() {
        let svc = test_service().await;
        let (sender, _) = setup(&svc).await;
        let input = invite_input("guest@example.com", &["acc-00000000".to_string()]);
        assert!(svc.create_invite(&sender.id, &input, now() + Duration::days(1)).await.is_err());
        assert!(svc.list_sent_invites(&sender.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_lookup_filters_status_and_expiry() {
        let svc = test_service().await;
        let (sender, accounts) = setup(&svc).await;
        let t = now();
        let open = svc
            .create_invite(&sender.id, &invite_input("guest@example.com", &accounts), t + Duration::days(1))
            .await
            .unwrap();
        svc.create_invite(&sender.id, &invite_input("guest@example.com", &accounts), t - Duration::seconds(1))
            .await
            .unwrap();
        let accepted = svc
            .create_invite(&sender.id, &invite_input("guest@example.com", &accounts), t + Duration::days(1))
            .await
            .unwrap();
        svc.mark_invite_accepted(&accepted.id, t, None).await.unwrap();
        svc.create_invite(&sender.id, &invite_input("other@example.com", &accounts), t + Duration::days(1))
            .await
            .unwrap();

        let found = svc.find_pending_invites("  GUEST@example.com", t, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, open.id);
        assert_eq!(found[0].accounts.len(), 2);
    }

    #[tokio::test]
    async fn pending_lookup_matches_unnormalized_rows() {
        let svc = test_service().await;
        let (sender, accounts) = setup(&svc).await;
        let invite = svc
            .create_invite(&sender.id, &invite_input("guest@example.com", &accounts), now() + Duration::days(1))
            .await
            .unwrap();
        svc.db()
            .conn()
            .await
            .execute("UPDATE invites SET email = ' Guest@Example.COM ' WHERE id = ?1", [invite.id.as_str()])
            .await
            .unwrap();
        let found = svc.find_pending_invites("guest@example.com", now(), None).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn reject_only_once() {
        let svc = test_service().await;
        let (sender, accounts) = setup(&svc).await;
        let guest = create_test_user(&svc, "Convidada", "guest@example.com").await;
        let invite = svc
            .create_invite(&sender.id, &invite_input("guest@example.com", &accounts), now() + Duration::days(1))
            .await
            .unwrap();

        let rejected = svc.reject_invite(&invite.id, &guest.id).await.unwrap();
        assert_eq!(rejected.status, InviteStatus::Rejected);
        let err = svc.reject_invite(&invite.id, &guest.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(ref msg) if msg == INVITE_NOT_PENDING));
        assert!(svc.get_permission(&accounts[0], &guest.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expire_moves_only_stale_pending() {
        let svc = test_service().await;
        let (sender, accounts) = setup(&svc).await;
        let t = now();
        let stale = svc
            .create_invite(&sender.id, &invite_input("a@example.com", &accounts), t - Duration::hours(1))
            .await
            .unwrap();
        let fresh = svc
            .create_invite(&sender.id, &invite_input("b@example.com", &accounts), t + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(svc.expire_stale_invites(t).await.unwrap(), vec![stale.id.clone()]);
        assert_eq!(svc.get_invite(&stale.id, None).await.unwrap().status, InviteStatus::Expired);
        assert_eq!(svc.get_invite(&fresh.id, None).await.unwrap().status, InviteStatus::Pending);
        assert!(svc.expire_stale_invites(t).await.unwrap().is_empty());

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::InviteExpired),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].user_id, sender.id);
    }

    #[test]
    fn ensure_open_rules() {
        let t = now();
        let mut invite = Invite {
            id: "inv-1".into(),
            sender_id: "usr-1".into(),
            email: "a@example.com".into(),
            status: InviteStatus::Pending,
            expires_at: t + Duration::minutes(1),
            accounts: Vec::new(),
            created_at: t,
            updated_at: t,
        };
        assert!(ensure_open(&invite, t).is_ok());
        assert!(matches!(ensure_open(&invite, t + Duration::minutes(1)), Err(DatabaseError::InvalidState(ref m)) if m == INVITE_EXPIRED));
        invite.status = InviteStatus::Accepted;
        assert!(matches!(ensure_open(&invite, t), Err(DatabaseError::InvalidState(ref m)) if m == INVITE_NOT_PENDING));
    }
}
