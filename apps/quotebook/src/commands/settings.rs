//! # Settings Commands
//!
//! Business profile and quote defaults. These live in the database and are
//! part of every export.

use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, SettingsState};
use quotebook_core::{Settings, SettingsPatch};

/// Returns the cached settings record.
pub fn get_settings(settings: &SettingsState) -> Settings {
    settings.snapshot()
}

pub async fn update_settings(
    db: &DbState,
    settings: &SettingsState,
    patch: SettingsPatch,
) -> ApiResult<Settings> {
    if patch.is_empty() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let updated = db.inner().settings().update(patch).await?;
    settings.replace(updated.clone());

    info!("Settings updated");
    Ok(updated)
}

/// Restores defaults. The quote counter keeps its value.
pub async fn reset_settings(db: &DbState, settings: &SettingsState) -> ApiResult<Settings> {
    let reset = db.inner().settings().reset().await?;
    settings.replace(reset.clone());
    Ok(reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;
    use quotebook_core::Theme;

    #[tokio::test]
    async fn test_update_refreshes_cache() {
        let (db, settings) = state().await;

        let updated = update_settings(
            &db,
            &settings,
            SettingsPatch::default()
                .business_name("Shipshape")
                .theme(Theme::Dark),
        )
        .await
        .unwrap();

        assert_eq!(updated.business_name, "Shipshape");
        assert_eq!(get_settings(&settings), updated);
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_cache_alone() {
        let (db, settings) = state().await;
        let before = get_settings(&settings);

        let err = update_settings(&db, &settings, SettingsPatch::default().default_tax_rate(2.0))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_settings(&settings), before);
    }

    #[tokio::test]
    async fn test_reset_keeps_counter() {
        let (db, settings) = state().await;
        db.inner()
            .settings()
            .allocate_quote_id(chrono::NaiveDate::from_ymd_opt(2025, 3, 7).unwrap())
            .await
            .unwrap();
        update_settings(&db, &settings, SettingsPatch::default().business_name("Shipshape"))
            .await
            .unwrap();

        let reset = reset_settings(&db, &settings).await.unwrap();
        assert_eq!(reset.business_name, "");
        assert_eq!(reset.next_sequence, 2);
    }
}
