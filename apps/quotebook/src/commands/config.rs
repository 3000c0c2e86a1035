//! # Config Commands
//!
//! Read and change the local [`AppConfig`]. Changes are written back to the
//! config file immediately.

use serde::Serialize;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::state::{AppConfig, ConfigUpdate};
use quotebook_core::{Settings, Theme};
use quotebook_db::{Database, DbConfig};

/// What `config show` prints: stored overrides next to effective values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub config_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub currency_symbol: String,
    pub theme_override: Option<Theme>,
    pub tax_rate_override: Option<f64>,
    /// Present when the business settings were available.
    pub effective_theme: Option<Theme>,
    pub effective_tax_rate: Option<f64>,
}

pub fn show_config(
    config: &AppConfig,
    config_path: Option<PathBuf>,
    settings: Option<&Settings>,
) -> ConfigView {
    ConfigView {
        config_path: config_path.or_else(AppConfig::default_config_path),
        db_path: config.db_path.clone(),
        currency_symbol: config.currency_symbol.clone(),
        theme_override: config.theme,
        tax_rate_override: config.default_tax_rate,
        effective_theme: settings.map(|s| config.effective_theme(s)),
        effective_tax_rate: settings.map(|s| config.effective_tax_rate(s)),
    }
}

/// Applies an update to what the file holds and saves it. Environment
/// overrides in effect for this run are not written. Returns the path
/// written.
pub fn update_config(update: ConfigUpdate, config_path: Option<PathBuf>) -> ApiResult<PathBuf> {
    if update == ConfigUpdate::default() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let mut stored = AppConfig::load_file(config_path.clone())?;
    stored.apply(update)?;
    Ok(stored.save(config_path)?)
}

/// Restores defaults and saves the file.
pub fn reset_config(config_path: Option<PathBuf>) -> ApiResult<PathBuf> {
    Ok(AppConfig::default().save(config_path)?)
}

/// Business settings from an existing database, for `config show`.
///
/// `None` when there is no database file yet; one is never created here.
/// An unreadable database is logged and treated the same way.
pub async fn stored_settings(db_path: Option<PathBuf>) -> Option<Settings> {
    let path = db_path.filter(|p| p.is_file())?;

    let db = match Database::new(DbConfig::new(&path)).await {
        Ok(db) => db,
        Err(e) => {
            warn!(path = %path.display(), "Could not open database for config show: {}", e);
            return None;
        }
    };

    let settings = match db.settings().get().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Could not read settings: {}", e);
            None
        }
    };
    db.close().await;
    settings
}
