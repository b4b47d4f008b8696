//! User repository: signup insert, lookups and profile updates.

use dindinho_core::entities::User;
use dindinho_core::enums::{AuditAction, ResourceType};
use dindinho_core::ids::PREFIX_USER;
use dindinho_schema::normalize_email;
use dindinho_schema::schemas::user::UpdateUser;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{now, parse_datetime, timestamp};
use crate::repos::audit::{AuditRecord, insert_audit};
use crate::service::{DbTransaction, DindinhoService};

pub const EMAIL_TAKEN: &str = "E-mail já cadastrado";

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

/// A user row together with its stored password hash. Only login needs this.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        email: row.get::<String>(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl DindinhoService {
    /// Insert a user. The email is stored normalized.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Conflict` if the email is already registered.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        tx: Option<&DbTransaction>,
    ) -> Result<User, DatabaseError> {
        let conn = self.executor(tx).await;
        let email = normalize_email(email);

        let mut rows = conn
            .query("SELECT 1 FROM users WHERE email = ?1", [email.as_str()])
            .await?;
        if rows.next().await?.is_some() {
            return Err(DatabaseError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let now = now();
        let id = generate_id(&conn, PREFIX_USER).await?;
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            libsql::params![id.as_str(), name, email.as_str(), password_hash, timestamp(now)],
        )
        .await?;

        insert_audit(
            &conn,
            &AuditRecord::new(id.as_str(), AuditAction::UserSignup, ResourceType::User, id.as_str()),
        )
        .await?;
        drop(conn);

        tracing::debug!(user_id = %id, "user created");
        Ok(User {
            id,
            name: name.to_string(),
            email,
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// `DatabaseError::NoResult` if no user has this id.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .await
            .query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    /// Look up a user and password hash by email, in any casing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_credentials_by_email(
        &self,
        email: &str,
        tx: Option<&DbTransaction>,
    ) -> Result<Option<UserCredentials>, DatabaseError> {
        let email = normalize_email(email);
        let mut rows = self
            .executor(tx)
            .await
            .query(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"),
                [email.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(UserCredentials {
                user: row_to_user(&row)?,
                password_hash: row.get::<String>(5)?,
            })),
            None => Ok(None),
        }
    }

    /// Apply a profile update.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Conflict` if the new email belongs to someone else,
    /// `DatabaseError::NoResult` if the user does not exist.
    pub async fn update_user(&self, id: &str, update: &UpdateUser) -> Result<User, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref name) = update.name {
            params.push(name.as_str().into());
            sets.push(format!("name = ?{}", params.len()));
        }
        if let Some(ref email) = update.email {
            let email = normalize_email(email);
            let mut rows = self
                .db()
                .conn()
                .await
                .query("SELECT 1 FROM users WHERE email = ?1 AND id != ?2", [email.as_str(), id])
                .await?;
            if rows.next().await?.is_some() {
                return Err(DatabaseError::Conflict(EMAIL_TAKEN.to_string()));
            }
            params.push(email.into());
            sets.push(format!("email = ?{}", params.len()));
        }

        if sets.is_empty() {
            return self.get_user(id).await;
        }

        params.push(timestamp(now()).into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(id.into());
        let sql = format!("UPDATE users SET {} WHERE id = ?{}", sets.join(", "), params.len());

        let changed = self
            .db()
            .conn()
            .await
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_user(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{create_test_user, test_service};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn create_normalizes_email_and_audits() {
        let svc = test_service().await;
        let user = create_test_user(&svc, "Maria", "  Maria@Example.COM ").await;
        assert_eq!(user.email, "maria@example.com");
        assert!(dindinho_core::ids::has_prefix(&user.id, PREFIX_USER));

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::UserSignup),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].resource_id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = test_service().await;
        create_test_user(&svc, "Maria", "maria@example.com").await;
        let err = svc
            .create_user("Outra", "MARIA@example.com", "h", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(ref msg) if msg == EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn credentials_lookup_ignores_case() {
        let svc = test_service().await;
        let user = create_test_user(&svc, "Maria", "maria@example.com").await;
        let creds = svc
            .find_credentials_by_email(" MARIA@example.com", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.user, user);
        assert_eq!(creds.password_hash, "$argon2id$test");
        assert!(svc.find_credentials_by_email("other@example.com", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_name_and_email() {
        let svc = test_service().await;
        let user = create_test_user(&svc, "Maria", "maria@example.com").await;
        let update = UpdateUser::parse(&json!({ "name": "Maria Silva", "email": "MS@example.com" })).unwrap();
        let updated = svc.update_user(&user.id, &update).await.unwrap();
        assert_eq!(updated.name, "Maria Silva");
        assert_eq!(updated.email, "ms@example.com");
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let svc = test_service().await;
        let maria = create_test_user(&svc, "Maria", "maria@example.com").await;
        create_test_user(&svc, "João", "joao@example.com").await;
        let update = UpdateUser::parse(&json!({ "email": "joao@example.com" })).unwrap();
        assert!(matches!(
            svc.update_user(&maria.id, &update).await,
            Err(DatabaseError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn get_missing_user() {
        let svc = test_service().await;
        assert!(matches!(svc.get_user("usr-00000000").await, Err(DatabaseError::NoResult)));
    }
}
