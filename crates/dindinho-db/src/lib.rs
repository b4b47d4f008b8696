//! # dindinho-db
//!
//! libSQL storage for Dindinho.
//!
//! Holds users, accounts, account grants, invites and the audit log, and hosts
//! the onboarding service that turns pending invites into grants when the
//! invited person signs up.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode. The one
//! connection sits behind an async mutex: a statement outside a transaction
//! holds the lock for that statement, a [`service::DbTransaction`] holds it
//! until it commits or rolls back. Write paths that must be atomic take an
//! optional `&DbTransaction`; when it is `None` each statement commits on its
//! own.

pub mod error;
pub mod helpers;
mod migrations;
pub mod onboarding;
pub mod repos;
pub mod service;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

/// Database handle: one libSQL database and its connection.
pub struct DindinhoDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Arc<Mutex<libsql::Connection>>,
}

impl DindinhoDb {
    /// Open a local database at `path` (`":memory:"` for tests).
    ///
    /// Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys are per-connection in SQLite
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let db = Self {
            db,
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(db)
    }

    /// Lock the shared connection.
    ///
    /// Waits while a transaction is open. Never call this while holding a
    /// [`service::DbTransaction`] on the same task.
    pub async fn conn(&self) -> MutexGuard<'_, libsql::Connection> {
        let conn = self.conn.lock().await;
        close_abandoned_transaction(&conn).await;
        conn
    }

    /// Lock the shared connection for as long as the guard lives.
    pub(crate) async fn lock_owned(&self) -> OwnedMutexGuard<libsql::Connection> {
        let conn = Arc::clone(&self.conn).lock_owned().await;
        close_abandoned_transaction(&conn).await;
        conn
    }

    /// Generate a prefixed ID, e.g. `"inv-a3f8b2c1d4e5f6a7"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id(&*self.conn().await, prefix).await
    }
}

/// Roll back a transaction whose handle was dropped mid-flight (e.g. a
/// cancelled request), so the next holder starts in autocommit mode.
async fn close_abandoned_transaction(conn: &libsql::Connection) {
    if conn.is_autocommit() {
        return;
    }
    tracing::warn!("rolling back a transaction left open by a dropped handle");
    if let Err(e) = conn.execute("ROLLBACK", ()).await {
        tracing::warn!(error = %e, "rollback of abandoned transaction failed");
    }
}

/// Generate a prefixed ID on `conn`, which may be a transaction.
///
/// Uses `randomblob(8)` to produce 16 hex chars, then prepends the prefix.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query("SELECT ?1 || '-' || lower(hex(randomblob(8)))", [prefix])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
