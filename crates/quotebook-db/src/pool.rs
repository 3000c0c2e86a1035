//! # Opening the Record Store
//!
//! ```text
//!   DbConfig::new("~/.local/share/quotebook/quotebook.db")   DbConfig::in_memory()
//!          │                                                        │
//!          ▼                                                        ▼
//!   Location::File  ── WAL, busy timeout ──┐        Location::Memory ── one pinned connection
//!                                          ▼                                   │
//!                             Database::new(config) ◄──────────────────────────┘
//!                                          │
//!                                  embedded migrations
//!                                          │
//!            db.clients() · db.catalog() · db.quotes() · db.settings() · db.backup()
//! ```
//!
//! Quotebook is a single-user tool, but two invocations can overlap (an
//! export running while a quote is being edited). WAL lets the reader
//! proceed; the busy timeout makes a second writer wait for the lock
//! instead of failing with `SQLITE_BUSY`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::backup::BackupRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::client::ClientRepository;
use crate::repository::quote::QuoteRepository;
use crate::repository::settings::SettingsRepository;

/// Where the records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// Private to the pool and gone when it closes. Tests only.
    Memory,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: Location,

    /// Default: 4. Forced to 1 for [`Location::Memory`], where every new
    /// connection would open a fresh empty database.
    pub max_connections: u32,

    /// How long a writer waits on a locked database file. Default: 5 seconds
    pub busy_timeout: Duration,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// A database file, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: Location::File(path.into()),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn in_memory() -> Self {
        DbConfig {
            location: Location::Memory,
            max_connections: 1,
            busy_timeout: Duration::ZERO,
            run_migrations: true,
        }
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// The database file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            Location::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(self.busy_timeout),
            Location::Memory => SqliteConnectOptions::new().in_memory(true),
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            // off by default in SQLite; quotes → clients and line items → quotes rely on it
            .foreign_keys(true)
            .create_if_missing(true)
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        match self.location {
            Location::File(_) => SqlitePoolOptions::new()
                .max_connections(self.max_connections.max(1))
                .idle_timeout(Some(Duration::from_secs(600))),
            // reaping the only connection would drop the data with it
            Location::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        }
    }
}

/// Handle to the record store. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store described by `config`, creating and migrating it as
    /// needed.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match config.path() {
            Some(path) => info!(path = %path.display(), "Opening record store"),
            None => info!("Opening in-memory record store"),
        }

        let pool = config
            .pool_options()
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.pool.clone())
    }

    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub fn quotes(&self) -> QuoteRepository {
        QuoteRepository::new(self.pool.clone())
    }

    /// Settings, including the quote ID counter.
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    pub fn backup(&self) -> BackupRepository {
        BackupRepository::new(self.pool.clone())
    }

    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// Waits for in-flight work and closes every connection. Later calls
    /// fail with [`DbError::ConnectionFailed`].
    pub async fn close(&self) {
        debug!("Closing record store");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_is_fully_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let status = db.migration_status().await.unwrap();
        assert!(status.is_current());
        assert!(status.applied > 0);
    }

    #[test]
    fn test_config_locations() {
        let file = DbConfig::new("/tmp/quotebook-test.db").run_migrations(false);
        assert_eq!(file.path(), Some(Path::new("/tmp/quotebook-test.db")));
        assert_eq!(file.busy_timeout, Duration::from_secs(5));
        assert!(!file.run_migrations);

        let memory = DbConfig::in_memory();
        assert_eq!(memory.location, Location::Memory);
        assert!(memory.path().is_none());
    }

    #[tokio::test]
    async fn test_unmigrated_store_reports_pending() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let status = db.migration_status().await.unwrap();
        assert_eq!(status.applied, 0);
        assert!(!status.is_current());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_queries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(matches!(
            db.clients().count().await,
            Err(DbError::ConnectionFailed(_))
        ));
    }
}
