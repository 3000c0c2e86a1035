//! # Schema Migrations
//!
//! SQL files under `migrations/sqlite/` at the workspace root are compiled
//! into the binary and applied in filename order when a [`Database`] opens.
//! sqlx records each applied file in `_sqlx_migrations` along with its
//! checksum, so editing a shipped migration makes every existing store
//! refuse to open. Add `NNN_description.sql` with the next number instead.
//!
//! [`Database`]: crate::Database

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Embedded vs applied migration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies pending migrations. Running it on a current store is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    debug!(embedded = MIGRATOR.migrations.len(), "Schema is current");
    Ok(())
}

/// A store that was never migrated has no bookkeeping table and reports
/// zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}
