//! # Settings State
//!
//! In-memory copy of the business [`Settings`] record.
//!
//! The database is the source of truth. This copy is loaded at startup and
//! replaced only after a write has been committed, so it never shows a
//! value the store rejected.

use std::sync::{Arc, Mutex};

use quotebook_core::Settings;
use quotebook_db::{Database, DbResult};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SettingsState {
    settings: Arc<Mutex<Settings>>,
}

impl SettingsState {
    pub fn new(settings: Settings) -> Self {
        SettingsState {
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    /// Reads the record from the database, creating it on first run.
    pub async fn load(db: &Database) -> DbResult<Self> {
        let settings = db.settings().get_or_init().await?;
        debug!(next_sequence = settings.next_sequence, "Settings loaded");
        Ok(SettingsState::new(settings))
    }

    /// Executes a function with read access to the settings.
    pub fn with_settings<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Settings) -> R,
    {
        let settings = self.settings.lock().expect("Settings mutex poisoned");
        f(&settings)
    }

    pub fn snapshot(&self) -> Settings {
        self.with_settings(Settings::clone)
    }

    /// Replaces the cached copy with a committed record.
    pub fn replace(&self, settings: Settings) {
        let mut current = self.settings.lock().expect("Settings mutex poisoned");
        *current = settings;
    }

    /// Re-reads the record after a bulk change such as an import.
    pub async fn refresh(&self, db: &Database) -> DbResult<Settings> {
        let settings = db.settings().get_or_init().await?;
        self.replace(settings.clone());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotebook_core::Theme;
    use quotebook_db::DbConfig;

    #[test]
    fn test_replace_is_visible_to_clones() {
        let state = SettingsState::default();
        let other = state.clone();

        state.replace(Settings {
            business_name: "Shipshape".into(),
            ..Default::default()
        });

        assert_eq!(other.with_settings(|s| s.business_name.clone()), "Shipshape");
    }

    #[tokio::test]
    async fn test_load_and_refresh() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = SettingsState::load(&db).await.unwrap();
        assert_eq!(state.snapshot().next_sequence, 1);

        db.settings()
            .update(quotebook_core::SettingsPatch::default().theme(Theme::Dark))
            .await
            .unwrap();
        assert_eq!(state.snapshot().theme, Theme::System);

        state.refresh(&db).await.unwrap();
        assert_eq!(state.snapshot().theme, Theme::Dark);
    }
}
