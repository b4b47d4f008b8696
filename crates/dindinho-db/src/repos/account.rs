//! Account repository.
//!
//! Creating an account also grants its owner `OWNER` access, inside one
//! transaction. Reads are scoped by grant, so shared accounts show up next to
//! owned ones.

use dindinho_core::audit_detail::AccountUpdatedDetail;
use dindinho_core::entities::Account;
use dindinho_core::enums::{AuditAction, Permission, ResourceType};
use dindinho_core::ids::PREFIX_ACCOUNT;
use dindinho_schema::schemas::account::{CreateAccount, UpdateAccount};
use serde::Serialize;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_day, get_opt_string, now, parse_datetime, parse_enum, timestamp};
use crate::repos::access::new_grant;
use crate::repos::audit::AuditRecord;
use crate::service::{DbTransaction, DindinhoService};

const ACCOUNT_COLUMNS: &str = "a.id, a.owner_id, a.name, a.type, a.color, a.icon, a.closing_day, \
                               a.due_day, a.credit_limit, a.brand, a.created_at, a.updated_at";

/// An account as seen by one user, with the permission they hold on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithAccess {
    #[serde(flatten)]
    pub account: Account,
    pub permission: Permission,
}

fn row_to_account(row: &libsql::Row) -> Result<Account, DatabaseError> {
    Ok(Account {
        id: row.get::<String>(0)?,
        owner_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        account_type: parse_enum(&row.get::<String>(3)?)?,
        color: get_opt_string(row, 4)?,
        icon: get_opt_string(row, 5)?,
        closing_day: get_opt_day(row, 6)?,
        due_day: get_opt_day(row, 7)?,
        limit: row.get::<Option<f64>>(8)?,
        brand: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

fn text_or_null(value: Option<&str>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |s| libsql::Value::Text(s.to_string()))
}

fn day_or_null(value: Option<u8>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |d| libsql::Value::Integer(i64::from(d)))
}

fn real_or_null(value: Option<f64>) -> libsql::Value {
    value.map_or(libsql::Value::Null, libsql::Value::Real)
}

impl DindinhoService {
    /// Create an account and its owner grant atomically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails; nothing is persisted then.
    pub async fn create_account(&self, owner_id: &str, input: &CreateAccount) -> Result<Account, DatabaseError> {
        let tx = self.begin().await?;
        let result = self.insert_account(owner_id, input, &tx).await;
        Self::settle(tx, result).await
    }

    async fn insert_account(
        &self,
        owner_id: &str,
        input: &CreateAccount,
        tx: &DbTransaction,
    ) -> Result<Account, DatabaseError> {
        let now = now();
        let id = generate_id(tx, PREFIX_ACCOUNT).await?;

        tx.execute(
            "INSERT INTO accounts (id, owner_id, name, type, color, icon, closing_day, due_day,
                                   credit_limit, brand, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            libsql::params_from_iter(vec![
                libsql::Value::Text(id.clone()),
                libsql::Value::Text(owner_id.to_string()),
                libsql::Value::Text(input.name.clone()),
                libsql::Value::Text(input.account_type.as_str().to_string()),
                text_or_null(input.color.as_deref()),
                text_or_null(input.icon.as_deref()),
                day_or_null(input.closing_day),
                day_or_null(input.due_day),
                real_or_null(input.limit),
                text_or_null(input.brand.as_deref()),
                libsql::Value::Text(timestamp(now)),
            ]),
        )
        .await?;

        self.upsert_account_access(&new_grant(&id, owner_id, Permission::Owner), Some(tx))
            .await?;
        self.append_audit(
            &AuditRecord::new(owner_id, AuditAction::AccountCreated, ResourceType::Account, id.as_str()),
            Some(tx),
        )
        .await?;

        tracing::debug!(account_id = %id, owner_id, "account created");
        Ok(Account {
            id,
            owner_id: owner_id.to_string(),
            name: input.name.clone(),
            account_type: input.account_type,
            color: input.color.clone(),
            icon: input.icon.clone(),
            closing_day: input.closing_day,
            due_day: input.due_day,
            limit: input.limit,
            brand: input.brand.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// `DatabaseError::NoResult` if the account does not exist.
    pub async fn get_account(&self, id: &str) -> Result<Account, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .await
            .query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_account(&row)
    }

    /// Accounts `user_id` holds any grant on, by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_accounts_for_user(&self, user_id: &str) -> Result<Vec<AccountWithAccess>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .await
            .query(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS}, g.permission
                     FROM accounts a JOIN account_access g ON g.account_id = a.id
                     WHERE g.user_id = ?1
                     ORDER BY a.name COLLATE NOCASE, a.id"
                ),
                [user_id],
            )
            .await?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next().await? {
            accounts.push(AccountWithAccess {
                account: row_to_account(&row)?,
                permission: parse_enum(&row.get::<String>(12)?)?,
            });
        }
        Ok(accounts)
    }

    /// Apply a partial update and audit the changed field names.
    ///
    /// Permission checks belong to the caller.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NoResult` if the account does not exist.
    pub async fn update_account(
        &self,
        user_id: &str,
        account_id: &str,
        update: &UpdateAccount,
    ) -> Result<Account, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        let mut set = |column: &str, value: libsql::Value| {
            params.push(value);
            sets.push(format!("{column} = ?{}", params.len()));
        };

        if let Some(ref name) = update.name {
            set("name", libsql::Value::Text(name.clone()));
        }
        if let Some(account_type) = update.account_type {
            set("type", libsql::Value::Text(account_type.as_str().to_string()));
        }
        if let Some(ref color) = update.color {
            set("color", text_or_null(color.as_deref()));
        }
        if let Some(ref icon) = update.icon {
            set("icon", text_or_null(icon.as_deref()));
        }
        if let Some(closing_day) = update.closing_day {
            set("closing_day", day_or_null(closing_day));
        }
        if let Some(due_day) = update.due_day {
            set("due_day", day_or_null(due_day));
        }
        if let Some(limit) = update.limit {
            set("credit_limit", real_or_null(limit));
        }
        if let Some(ref brand) = update.brand {
            set("brand", text_or_null(brand.as_deref()));
        }

        if sets.is_empty() {
            return self.get_account(account_id).await;
        }

        params.push(libsql::Value::Text(timestamp(now())));
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(libsql::Value::Text(account_id.to_string()));
        let sql = format!("UPDATE accounts SET {} WHERE id = ?{}", sets.join(", "), params.len());

        let tx = self.begin().await?;
        let result = async {
            let changed = tx.execute(&sql, libsql::params_from_iter(params)).await?;
            if changed == 0 {
                return Err(DatabaseError::NoResult);
            }
            let detail = AccountUpdatedDetail {
                fields: update.changed_fields().into_iter().map(String::from).collect(),
            };
            self.append_audit(
                &AuditRecord::new(user_id, AuditAction::AccountUpdated, ResourceType::Account, account_id)
                    .with_details(&detail)?,
                Some(&tx),
            )
            .await?;
            Ok::<(), DatabaseError>(())
        }
        .await;
        Self::settle(tx, result).await?;

        self.get_account(account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{create_test_account, create_test_user, test_service};
    use dindinho_core::enums::AccountType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn create_grants_owner_and_audits() {
        let svc = test_service().await;
        let owner = create_test_user(&svc, "Dona", "dona@example.com").await;
        let account = create_test_account(&svc, &owner.id, "Carteira").await;

        assert!(dindinho_core::ids::has_prefix(&account.id, PREFIX_ACCOUNT));
        assert_eq!(svc.get_account(&account.id).await.unwrap(), account);
        assert_eq!(
            svc.get_permission(&account.id, &owner.id).await.unwrap(),
            Some(Permission::Owner)
        );
        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::AccountCreated),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].resource_id, account.id);
    }

    #[tokio::test]
    async fn create_credit_account_round_trips() {
        let svc = test_service().await;
        let owner = create_test_user(&svc, "Dona", "dona@example.com").await;
        let input = CreateAccount::parse(&json!({
            "name": "Cartão",
            "type": "CREDIT",
            "closingDay": 3,
            "dueDay": "10",
            "limit": "1500.5",
            "brand": "Visa"
        }))
        .unwrap();
        let account = svc.create_account(&owner.id, &input).await.unwrap();
        let stored = svc.get_account(&account.id).await.unwrap();
        assert_eq!(stored.account_type, AccountType::Credit);
        assert_eq!(stored.closing_day, Some(3));
        assert_eq!(stored.due_day, Some(10));
        assert_eq!(stored.limit, Some(1500.5));
    }

    #[tokio::test]
    async fn create_for_unknown_owner_persists_nothing() {
        let svc = test_service().await;
        let input = CreateAccount::parse(&json!({ "name": "Órfã" })).unwrap();
        assert!(svc.create_account("usr-00000000", &input).await.is_err());
        assert!(svc.list_accounts_for_user("usr-00000000").await.unwrap().is_empty());
        assert!(svc.query_audit(&AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_includes_shared_accounts() {
        let svc = test_service().await;
        let owner = create_test_user(&svc, "Dona", "dona@example.com").await;
        let guest = create_test_user(&svc, "Convidada", "guest@example.com").await;
        let shared = create_test_account(&svc, &owner.id, "Casa").await;
        create_test_account(&svc, &owner.id, "Pessoal").await;
        svc.upsert_account_access(&new_grant(&shared.id, &guest.id, Permission::Viewer), None)
            .await
            .unwrap();

        let owner_view = svc.list_accounts_for_user(&owner.id).await.unwrap();
        assert_eq!(owner_view.len(), 2);
        let guest_view = svc.list_accounts_for_user(&guest.id).await.unwrap();
        assert_eq!(guest_view.len(), 1);
        assert_eq!(guest_view[0].account.id, shared.id);
        assert_eq!(guest_view[0].permission, Permission::Viewer);
    }

    #[tokio::test]
    async fn update_clears_and_sets_fields() {
        let svc = test_service().await;
        let owner = create_test_user(&svc, "Dona", "dona@example.com").await;
        let account = create_test_account(&svc, &owner.id, "Carteira").await;

        let update = UpdateAccount::parse(&json!({ "name": " Conta ", "brand": "  ", "dueDay": "5" })).unwrap();
        let updated = svc.update_account(&owner.id, &account.id, &update).await.unwrap();
        assert_eq!(updated.name, "Conta");
        assert_eq!(updated.brand, None);
        assert_eq!(updated.due_day, Some(5));

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::AccountUpdated),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(
            audit[0].details,
            Some(json!({ "fields": ["name", "dueDay", "brand"] }))
        );
    }

    #[tokio::test]
    async fn update_missing_account() {
        let svc = test_service().await;
        let update = UpdateAccount::parse(&json!({ "name": "X" })).unwrap();
        assert!(matches!(
            svc.update_account("usr-1", "acc-00000000", &update).await,
            Err(DatabaseError::NoResult)
        ));
        assert!(svc.query_audit(&AuditFilter::default()).await.unwrap().is_empty());
    }

    #[test]
    fn account_with_access_flattens() {
        let value = serde_json::to_value(AccountWithAccess {
            account: Account {
                id: "acc-1".into(),
                owner_id: "usr-1".into(),
                name: "Casa".into(),
                account_type: AccountType::Standard,
                color: None,
                icon: None,
                closing_day: None,
                due_day: None,
                limit: None,
                brand: None,
                created_at: chrono::DateTime::UNIX_EPOCH,
                updated_at: chrono::DateTime::UNIX_EPOCH,
            },
            permission: Permission::Editor,
        })
        .unwrap();
        assert_eq!(value["id"], "acc-1");
        assert_eq!(value["permission"], "EDITOR");
    }
}
