//! # Commands Module
//!
//! Every operation the CLI exposes, as plain async functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── client.rs   ◄─── Client CRUD
//! ├── catalog.rs  ◄─── Service catalog CRUD
//! ├── quote.rs    ◄─── Quote creation, status, edits
//! ├── settings.rs ◄─── Business settings
//! ├── config.rs   ◄─── Local AppConfig
//! └── backup.rs   ◄─── Export / import
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! pub async fn list_clients(db: &DbState) -> ApiResult<Vec<Client>>
//!
//! // Needs database, cached settings and config
//! pub async fn create_quote(
//!     db: &DbState,
//!     settings: &SettingsState,
//!     config: &AppConfig,
//!     input: NewQuote,
//! ) -> ApiResult<Quote>
//! ```
//!
//! Commands return domain values or small DTOs that serialize as camelCase,
//! so `--json` output matches the export format.

pub mod backup;
pub mod catalog;
pub mod client;
pub mod config;
pub mod quote;
pub mod settings;
