//! # Repository Module
//!
//! One repository per record collection.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Command layer                                                         │
//! │       │  db.quotes().create(draft, now)                                │
//! │       ▼                                                                 │
//! │  QuoteRepository::create            ← public: owns the transaction     │
//! │       │  begin ─┐                                                       │
//! │       │         ├─ settings::allocate_in(&mut tx)                      │
//! │       │         ├─ quote::insert_in(&mut tx)                           │
//! │       │  commit ┘                                                       │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! │                                                                         │
//! │  `*_in(conn)` helpers take a bare connection so several repositories   │
//! │  can share one transaction (quote creation, export, import).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Client CRUD
//! - [`CatalogRepository`](catalog::CatalogRepository) - Service catalog CRUD
//! - [`QuoteRepository`](quote::QuoteRepository) - Quotes and their line items
//! - [`SettingsRepository`](settings::SettingsRepository) - Settings record and the quote counter
//! - [`BackupRepository`](backup::BackupRepository) - Export / import of everything

pub mod backup;
pub mod catalog;
pub mod client;
pub mod quote;
pub mod settings;

use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};

/// Timestamps are stored as INTEGER milliseconds since the Unix epoch.
pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DbError::InvalidData(format!("timestamp out of range: {}", ms)))
}
