//! Embedded schema migrations, applied in order on every open.
//!
//! Each file is idempotent (`IF NOT EXISTS` throughout), so there is no
//! version table: re-running a migration is a no-op.

use crate::DindinhoDb;
use crate::error::DatabaseError;

const MIGRATIONS: &[(&str, &str)] = &[("001_initial", include_str!("../migrations/001_initial.sql"))];

impl DindinhoDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let conn = self.conn().await;
        for (name, sql) in MIGRATIONS {
            conn.execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::trace!(migration = name, "migration applied");
        }
        Ok(())
    }
}
