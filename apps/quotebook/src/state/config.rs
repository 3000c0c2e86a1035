//! # Application Configuration
//!
//! Machine-local preferences, separate from the business [`Settings`] record
//! that lives in the database and travels with exports.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUOTEBOOK_DB_PATH=/srv/quotebook.db                                │
//! │     QUOTEBOOK_THEME=dark                                               │
//! │     QUOTEBOOK_CURRENCY_SYMBOL=€                                        │
//! │     QUOTEBOOK_DEFAULT_TAX_RATE=0.2                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/quotebook/quotebook.toml (Linux)                         │
//! │     ~/Library/Application Support/com.quotebook.quotebook/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # quotebook.toml
//! db_path = "/home/ada/quotes/quotebook.db"
//! theme = "dark"
//! currency_symbol = "$"
//! default_tax_rate = 0.0825
//! ```
//!
//! `theme` and `default_tax_rate` are overrides: when unset, the values
//! stored in the business settings apply.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use quotebook_core::validation::validate_tax_rate;
use quotebook_core::{Settings, Theme, ValidationError};

const CONFIG_FILE_NAME: &str = "quotebook.toml";
const DB_FILE_NAME: &str = "quotebook.db";

/// Errors while loading or saving [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Could not determine a config directory for this platform")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Machine-local application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Overrides the theme stored in the business settings.
    pub theme: Option<Theme>,

    /// Symbol used when printing amounts.
    pub currency_symbol: String,

    /// Overrides the tax rate pre-filled on new quotes.
    pub default_tax_rate: Option<f64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: None,
            theme: None,
            currency_symbol: "$".to_string(),
            default_tax_rate: None,
        }
    }
}

/// Explicit changes to [`AppConfig`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub db_path: Option<PathBuf>,
    pub theme: Option<Theme>,
    pub currency_symbol: Option<String>,
    pub default_tax_rate: Option<f64>,
}

impl AppConfig {
    /// Loads configuration: defaults, then the file, then the environment.
    ///
    /// A missing file is not an error. A malformed one is. The result is
    /// the effective view; never [`save`](Self::save) it, or environment
    /// overrides would end up in the file. Use [`load_file`](Self::load_file)
    /// for anything that gets written back.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Loads only what is stored in the file, ignoring `QUOTEBOOK_*`.
    pub fn load_file(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |_| None)
    }

    /// Like [`load`](Self::load) with `env` standing in for the process
    /// environment.
    pub fn load_with<F>(config_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(rate) = self.default_tax_rate {
            validate_tax_rate(rate)?;
        }

        if self.currency_symbol.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "currency_symbol".into(),
            }
            .into());
        }

        Ok(())
    }

    /// Applies an update and validates the result. On error `self` is
    /// left unchanged.
    pub fn apply(&mut self, update: ConfigUpdate) -> ConfigResult<()> {
        let mut next = self.clone();

        if let Some(path) = update.db_path {
            next.db_path = Some(path);
        }
        if let Some(theme) = update.theme {
            next.theme = Some(theme);
        }
        if let Some(symbol) = update.currency_symbol {
            next.currency_symbol = symbol;
        }
        if let Some(rate) = update.default_tax_rate {
            next.default_tax_rate = Some(rate);
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Theme to render with: the local override, else the business setting.
    pub fn effective_theme(&self, settings: &Settings) -> Theme {
        self.theme.unwrap_or(settings.theme)
    }

    /// Tax rate for new quotes: the local override, else the business default.
    pub fn effective_tax_rate(&self, settings: &Settings) -> f64 {
        self.default_tax_rate.unwrap_or(settings.default_tax_rate)
    }

    /// Resolves the database file. Creates the data directory when falling
    /// back to the platform default.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoConfigDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DB_FILE_NAME))
    }

    /// Where [`database_path`](Self::database_path) would point, without
    /// creating anything.
    pub fn locate_database(&self) -> Option<PathBuf> {
        self.db_path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(DB_FILE_NAME)))
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("QUOTEBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.db_path = Some(PathBuf::from(path));
        }

        if let Some(theme) = env("QUOTEBOOK_THEME") {
            match theme.parse() {
                Ok(parsed) => self.theme = Some(parsed),
                Err(e) => warn!(theme = %theme, "Ignoring QUOTEBOOK_THEME: {}", e),
            }
        }

        if let Some(symbol) = env("QUOTEBOOK_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(rate) = env("QUOTEBOOK_DEFAULT_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(parsed) => self.default_tax_rate = Some(parsed),
                Err(_) => warn!(rate = %rate, "Ignoring QUOTEBOOK_DEFAULT_TAX_RATE: not a number"),
            }
        }
    }

    /// `<config dir>/quotebook.toml` for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Shortens the home directory to `~` for display.
    pub fn display_path(path: &Path) -> String {
        match directories::BaseDirs::new() {
            Some(base) => match path.strip_prefix(base.home_dir()) {
                Ok(rest) => format!("~/{}", rest.display()),
                Err(_) => path.display().to_string(),
            },
            None => path.display().to_string(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "quotebook", "quotebook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.currency_symbol, "$");
        assert!(config.theme.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = AppConfig::default();
        config.theme = Some(Theme::Dark);
        config.currency_symbol = "€".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: AppConfig = toml::from_str(r#"theme = "light""#).unwrap();
        assert_eq!(parsed.theme, Some(Theme::Light));
        assert_eq!(parsed.currency_symbol, "$");
        assert!(parsed.db_path.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "theme = [").unwrap();

        assert!(matches!(
            AppConfig::load(Some(path)),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_apply_rejects_bad_tax_rate_and_keeps_state() {
        let mut config = AppConfig::default();
        let result = config.apply(ConfigUpdate {
            currency_symbol: Some("£".into()),
            default_tax_rate: Some(1.5),
            ..Default::default()
        });

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_apply_sets_fields() {
        let mut config = AppConfig::default();
        config
            .apply(ConfigUpdate {
                theme: Some(Theme::Light),
                default_tax_rate: Some(0.2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.theme, Some(Theme::Light));
        assert_eq!(config.default_tax_rate, Some(0.2));
    }

    #[test]
    fn test_effective_values_fall_back_to_settings() {
        let settings = Settings {
            theme: Theme::Dark,
            default_tax_rate: 0.08,
            ..Default::default()
        };

        let mut config = AppConfig::default();
        assert_eq!(config.effective_theme(&settings), Theme::Dark);
        assert_eq!(config.effective_tax_rate(&settings), 0.08);

        config.theme = Some(Theme::Light);
        config.default_tax_rate = Some(0.0);
        assert_eq!(config.effective_theme(&settings), Theme::Light);
        assert_eq!(config.effective_tax_rate(&settings), 0.0);
    }

    #[test]
    fn test_env_overrides_only_in_effective_view() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "currency_symbol = \"$\"\n").unwrap();

        let env = |key: &str| match key {
            "QUOTEBOOK_DB_PATH" => Some("/tmp/from-env.db".to_string()),
            "QUOTEBOOK_THEME" => Some("dark".to_string()),
            _ => None,
        };
        let effective = AppConfig::load_with(Some(path.clone()), env).unwrap();
        assert_eq!(effective.db_path, Some(PathBuf::from("/tmp/from-env.db")));
        assert_eq!(effective.theme, Some(Theme::Dark));

        let stored = AppConfig::load_file(Some(path)).unwrap();
        assert!(stored.db_path.is_none());
        assert!(stored.theme.is_none());
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let env = |key: &str| match key {
            "QUOTEBOOK_THEME" => Some("sepia".to_string()),
            "QUOTEBOOK_DEFAULT_TAX_RATE" => Some("lots".to_string()),
            _ => None,
        };
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_with(Some(dir.path().join(CONFIG_FILE_NAME)), env).unwrap();
        assert!(config.theme.is_none());
        assert!(config.default_tax_rate.is_none());
    }

    #[test]
    fn test_locate_database_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("sub").join("quotes.db");
        let config = AppConfig {
            db_path: Some(db.clone()),
            ..Default::default()
        };
        assert_eq!(config.locate_database(), Some(db));
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let config = AppConfig {
            db_path: Some(PathBuf::from("/tmp/quotes.db")),
            ..Default::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/quotes.db"));
    }
}
