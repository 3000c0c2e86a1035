//! # quotebook-db: Database Layer for Quotebook
//!
//! Local record store for Quotebook, backed by SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quotebook Data Flow                              │
//! │                                                                         │
//! │  CLI command (quote new)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   quotebook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ClientRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo    │    │ 001_init.sql │  │   │
//! │  │   │               │    │ QuoteRepo      │    │              │  │   │
//! │  │   │               │    │ SettingsRepo   │    │              │  │   │
//! │  │   │               │    │ BackupRepo     │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file in the platform data dir (quotebook.db)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quotebook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("quotebook.db")).await?;
//!
//! db.clients().put(&Client::new("Ada")).await?;
//! let quote = db.quotes().create(draft, Utc::now()).await?;
//! let envelope = db.backup().export_all(Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, Location};

pub use repository::backup::{BackupRepository, ImportSummary};
pub use repository::catalog::CatalogRepository;
pub use repository::client::ClientRepository;
pub use repository::quote::QuoteRepository;
pub use repository::settings::SettingsRepository;
