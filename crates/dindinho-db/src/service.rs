//! Service layer: repositories, audit and onboarding hang off `DindinhoService`.
//!
//! Mutation methods that span several statements follow one protocol:
//! 1. Use the caller's transaction, or begin one
//! 2. Execute SQL
//! 3. Append audit entries (inside the transaction)
//! 4. Commit what they began; leave a caller's transaction to the caller
//!
//! A transaction holds the connection lock until it ends, so requests that
//! overlap wait for each other instead of sharing an open transaction.

use std::ops::Deref;

use dindinho_config::DatabaseConfig;
use tokio::sync::{MutexGuard, OwnedMutexGuard};

use crate::DindinhoDb;
use crate::error::DatabaseError;

pub struct DindinhoService {
    db: DindinhoDb,
}

/// An open transaction that owns the connection lock.
///
/// Dropping it without [`commit`](Self::commit) rolls back. While it lives,
/// every other user of the service waits, including calls on the same task
/// that pass `tx = None`.
pub struct DbTransaction {
    tx: libsql::Transaction,
    _lock: OwnedMutexGuard<libsql::Connection>,
}

impl DbTransaction {
    /// # Errors
    ///
    /// Returns `DatabaseError` if `COMMIT` fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        let Self { tx, _lock } = self;
        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if `ROLLBACK` fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        let Self { tx, _lock } = self;
        tx.rollback().await?;
        Ok(())
    }
}

impl Deref for DbTransaction {
    type Target = libsql::Connection;

    fn deref(&self) -> &libsql::Connection {
        &self.tx
    }
}

/// Where a statement runs: inside the caller's transaction, or on the shared
/// connection under its lock.
pub enum Executor<'a> {
    Transaction(&'a DbTransaction),
    Shared(MutexGuard<'a, libsql::Connection>),
}

impl Deref for Executor<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &libsql::Connection {
        match self {
            Self::Transaction(tx) => tx,
            Self::Shared(conn) => conn,
        }
    }
}

impl DindinhoService {
    /// Open a local database at `db_path` (`":memory:"` for tests).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: DindinhoDb::open_local(db_path).await?,
        })
    }

    /// Open the database named by the `[database]` config section.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::new_local(&config.url).await
    }

    #[must_use]
    pub const fn from_db(db: DindinhoDb) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn db(&self) -> &DindinhoDb {
        &self.db
    }

    /// The connection statements should run on: the caller's transaction if
    /// one was supplied, the locked shared connection otherwise.
    ///
    /// Drop the returned executor before calling another method with
    /// `tx = None`.
    pub async fn executor<'a>(&'a self, tx: Option<&'a DbTransaction>) -> Executor<'a> {
        match tx {
            Some(tx) => Executor::Transaction(tx),
            None => Executor::Shared(self.db.conn().await),
        }
    }

    /// Begin a deferred transaction, waiting for any open one to finish.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin(&self) -> Result<DbTransaction, DatabaseError> {
        let lock = self.db.lock_owned().await;
        let tx = lock.transaction().await?;
        Ok(DbTransaction { tx, _lock: lock })
    }

    /// Run `result` through `tx`: commit on `Ok`, roll back on `Err`.
    ///
    /// The original error is returned even if the rollback itself fails.
    ///
    /// # Errors
    ///
    /// The error in `result`, or the commit failure.
    pub async fn settle<T>(
        tx: DbTransaction,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Cheapest possible read, used by the `/test-db` diagnostic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_users(&self) -> Result<u64, DatabaseError> {
        let mut rows = self.db.conn().await.query("SELECT COUNT(*) FROM users", ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|e| DatabaseError::Query(format!("negative count: {e}")))
    }
}
