//! Account access grants.
//!
//! One row per `(account_id, user_id)`. Writes go through an upsert so a
//! repeated grant replaces the permission instead of failing.

use dindinho_core::entities::AccountAccess;
use dindinho_core::enums::Permission;

use crate::error::DatabaseError;
use crate::helpers::{now, parse_datetime, parse_enum, timestamp};
use crate::service::{DbTransaction, DindinhoService};

fn row_to_access(row: &libsql::Row) -> Result<AccountAccess, DatabaseError> {
    Ok(AccountAccess {
        account_id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        permission: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl DindinhoService {
    /// Create the grant, or overwrite its permission if the pair already exists.
    ///
    /// `created_at` of an existing grant is preserved.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the statement fails (e.g. unknown account).
    pub async fn upsert_account_access(
        &self,
        grant: &AccountAccess,
        tx: Option<&DbTransaction>,
    ) -> Result<(), DatabaseError> {
        self.executor(tx)
            .await
            .execute(
                "INSERT INTO account_access (account_id, user_id, permission, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(account_id, user_id)
                 DO UPDATE SET permission = excluded.permission, updated_at = excluded.updated_at",
                libsql::params![
                    grant.account_id.as_str(),
                    grant.user_id.as_str(),
                    grant.permission.as_str(),
                    timestamp(grant.created_at),
                    timestamp(grant.updated_at)
                ],
            )
            .await?;
        Ok(())
    }

    /// Permission `user_id` holds on `account_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_permission(
        &self,
        account_id: &str,
        user_id: &str,
    ) -> Result<Option<Permission>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .await
            .query(
                "SELECT permission FROM account_access WHERE account_id = ?1 AND user_id = ?2",
                [account_id, user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(parse_enum(&row.get::<String>(0)?)?)),
            None => Ok(None),
        }
    }

    /// Every grant on an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_account_access(&self, account_id: &str) -> Result<Vec<AccountAccess>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .await
            .query(
                "SELECT account_id, user_id, permission, created_at, updated_at
                 FROM account_access WHERE account_id = ?1 ORDER BY created_at, user_id",
                [account_id],
            )
            .await?;
        let mut grants = Vec::new();
        while let Some(row) = rows.next().await? {
            grants.push(row_to_access(&row)?);
        }
        Ok(grants)
    }
}

/// A fresh grant stamped with the current time.
#[must_use]
pub fn new_grant(account_id: &str, user_id: &str, permission: Permission) -> AccountAccess {
    let now = now();
    AccountAccess {
        account_id: account_id.to_string(),
        user_id: user_id.to_string(),
        permission,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{create_test_account, create_test_user, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn upsert_replaces_permission() {
        let svc = test_service().await;
        let owner = create_test_user(&svc, "Dona", "dona@example.com").await;
        let guest = create_test_user(&svc, "Convidada", "guest@example.com").await;
        let account = create_test_account(&svc, &owner.id, "Casa").await;

        svc.upsert_account_access(&new_grant(&account.id, &guest.id, Permission::Viewer), None)
            .await
            .unwrap();
        svc.upsert_account_access(&new_grant(&account.id, &guest.id, Permission::Editor), None)
            .await
            .unwrap();

        assert_eq!(
            svc.get_permission(&account.id, &guest.id).await.unwrap(),
            Some(Permission::Editor)
        );
        // owner grant + one guest grant
        assert_eq!(svc.list_account_access(&account.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn upsert_keeps_original_created_at() {
        let svc = test_service().await;
        let owner = create_test_user(&svc, "Dona", "dona@example.com").await;
        let guest = create_test_user(&svc, "Convidada", "guest@example.com").await;
        let account = create_test_account(&svc, &owner.id, "Casa").await;

        let first = new_grant(&account.id, &guest.id, Permission::Viewer);
        svc.upsert_account_access(&first, None).await.unwrap();
        let mut second = new_grant(&account.id, &guest.id, Permission::Owner);
        second.created_at += chrono::Duration::days(1);
        svc.upsert_account_access(&second, None).await.unwrap();

        let stored = svc
            .list_account_access(&account.id)
            .await
            .unwrap()
            .into_iter()
            .find(|g| g.user_id == guest.id)
            .unwrap();
        assert_eq!(stored.created_at, first.created_at);
        assert_eq!(stored.permission, Permission::Owner);
    }

    #[tokio::test]
    async fn no_grant_means_no_permission() {
        let svc = test_service().await;
        assert_eq!(svc.get_permission("acc-00000000", "usr-00000000").await.unwrap(), None);
    }
}
