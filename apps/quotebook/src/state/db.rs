//! # Database State
//!
//! Wraps the `Database` handle for use in commands.
//!
//! The `Database` from `quotebook-db` holds a `SqlitePool`, which is
//! thread-safe on its own, so no lock is needed here.

use quotebook_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let clients = db_state.inner().clients().list().await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
