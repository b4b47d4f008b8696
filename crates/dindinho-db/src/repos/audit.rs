//! Audit log repository.
//!
//! Append-only entries for every permission-relevant mutation, with
//! dynamic filtering for reads.

use dindinho_core::entities::AuditEntry;
use dindinho_core::enums::{AuditAction, ResourceType};
use dindinho_core::ids::PREFIX_AUDIT;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    get_opt_string, now, parse_datetime, parse_enum, parse_optional_json, timestamp, to_json,
};
use crate::service::{DbTransaction, DindinhoService};

/// An entry to append. ID and timestamp are assigned on write.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub user_id: String,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub details: Option<serde_json::Value>,
}

impl AuditRecord {
    pub fn new(
        user_id: impl Into<String>,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action,
            resource_type,
            resource_id: resource_id.into(),
            details: None,
        }
    }

    /// Attach a typed detail payload.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Other` if the payload cannot be serialized.
    pub fn with_details<T: Serialize>(mut self, details: &T) -> Result<Self, DatabaseError> {
        self.details = Some(to_json(details)?);
        Ok(self)
    }
}

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_entry(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        action: parse_enum(&row.get::<String>(2)?)?,
        resource_type: parse_enum(&row.get::<String>(3)?)?,
        resource_id: row.get::<String>(4)?,
        details: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Insert `record` on `conn`, which may be a transaction or an already
/// locked shared connection.
pub(crate) async fn insert_audit(
    conn: &libsql::Connection,
    record: &AuditRecord,
) -> Result<AuditEntry, DatabaseError> {
    let now = now();
    let id = generate_id(conn, PREFIX_AUDIT).await?;
    let details = record.details.as_ref().map(ToString::to_string);

    conn.execute(
        "INSERT INTO audit_logs (id, user_id, action, resource_type, resource_id, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            id.as_str(),
            record.user_id.as_str(),
            record.action.as_str(),
            record.resource_type.as_str(),
            record.resource_id.as_str(),
            details,
            timestamp(now)
        ],
    )
    .await?;

    Ok(AuditEntry {
        id,
        user_id: record.user_id.clone(),
        action: record.action,
        resource_type: record.resource_type,
        resource_id: record.resource_id.clone(),
        details: record.details.clone(),
        created_at: now,
    })
}

impl DindinhoService {
    /// Append an audit entry on the caller's transaction, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(
        &self,
        record: &AuditRecord,
        tx: Option<&DbTransaction>,
    ) -> Result<AuditEntry, DatabaseError> {
        insert_audit(&*self.executor(tx).await, record).await
    }

    /// Query audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref user_id) = filter.user_id {
            params.push(libsql::Value::Text(user_id.clone()));
            conditions.push(format!("user_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(resource_type) = filter.resource_type {
            params.push(libsql::Value::Text(resource_type.as_str().to_string()));
            conditions.push(format!("resource_type = ?{}", params.len()));
        }
        if let Some(ref resource_id) = filter.resource_id {
            params.push(libsql::Value::Text(resource_id.clone()));
            conditions.push(format!("resource_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, user_id, action, resource_type, resource_id, details, created_at
             FROM audit_logs {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .await
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use dindinho_core::audit_detail::AutoLinkInviteDetail;
    use dindinho_core::enums::Permission;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn append_and_query() {
        let svc = test_service().await;
        let record = AuditRecord::new("usr-1", AuditAction::AutoLinkInvite, ResourceType::Account, "acc-1")
            .with_details(&AutoLinkInviteDetail::signup("inv-1", Permission::Editor))
            .unwrap();
        let written = svc.append_audit(&record, None).await.unwrap();
        assert!(dindinho_core::ids::has_prefix(&written.id, PREFIX_AUDIT));

        let found = svc
            .query_audit(&AuditFilter {
                resource_id: Some("acc-1".into()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].action, AuditAction::AutoLinkInvite);
        assert_eq!(
            found[0].details,
            Some(serde_json::json!({
                "inviteId": "inv-1",
                "permission": "EDITOR",
                "reason": "signup_auto_link"
            }))
        );
    }

    #[tokio::test]
    async fn filters_combine() {
        let svc = test_service().await;
        for (user, action) in [
            ("usr-1", AuditAction::AccountCreated),
            ("usr-1", AuditAction::AccountUpdated),
            ("usr-2", AuditAction::AccountCreated),
        ] {
            svc.append_audit(&AuditRecord::new(user, action, ResourceType::Account, "acc-1"), None)
                .await
                .unwrap();
        }
        let found = svc
            .query_audit(&AuditFilter {
                user_id: Some("usr-1".into()),
                action: Some(AuditAction::AccountCreated),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let limited = svc
            .query_audit(&AuditFilter {
                limit: Some(2),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }
}
