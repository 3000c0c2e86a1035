//! # State Module
//!
//! Application state handed to commands. Each command takes only the
//! pieces it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │  SettingsState   │  │    AppConfig     │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Arc<Mutex<      │  │  db_path         │          │
//! │  │  (SQLite     │  │    Settings      │  │  theme override  │          │
//! │  │   pool)      │  │  >>              │  │  currency symbol │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  DbState:       pool is thread-safe on its own                         │
//! │  SettingsState: cached business record, replaced after each commit     │
//! │  AppConfig:     plain value, owned by the caller                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod settings;

pub use config::{AppConfig, ConfigError, ConfigResult, ConfigUpdate};
pub use db::DbState;
pub use settings::SettingsState;
