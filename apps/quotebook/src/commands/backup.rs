//! # Backup Commands
//!
//! Export every record to a JSON file and import one back.
//!
//! ```json
//! {
//!   "clients": [...],
//!   "quotes": [...],
//!   "settings": [{ "nextSequence": 42, ... }],
//!   "catalog": [...],
//!   "exportedAt": 1741348800000
//! }
//! ```
//!
//! Import replaces everything; it never merges.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ApiResult;
use crate::state::{DbState, SettingsState};
use quotebook_core::ExportEnvelope;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub path: PathBuf,
    pub clients: usize,
    pub catalog: usize,
    pub quotes: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub path: PathBuf,
    pub clients: usize,
    pub catalog: usize,
    pub quotes: usize,
    pub next_sequence: i64,
}

pub async fn export_to_file(db: &DbState, path: &Path) -> ApiResult<ExportReport> {
    let envelope = db.inner().backup().export_all(Utc::now()).await?;
    let json = envelope.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    info!(path = %path.display(), "Export written");
    Ok(ExportReport {
        path: path.to_path_buf(),
        clients: envelope.clients.len(),
        catalog: envelope.catalog.len(),
        quotes: envelope.quotes.len(),
        exported_at: envelope.exported_at,
    })
}

/// Replaces every local record with the file's contents.
///
/// Nothing changes unless the whole file imports cleanly.
pub async fn import_from_file(
    db: &DbState,
    settings: &SettingsState,
    path: &Path,
) -> ApiResult<ImportReport> {
    let json = std::fs::read_to_string(path)?;
    let envelope = ExportEnvelope::from_json(&json)?;

    let summary = db.inner().backup().import_all(envelope).await?;
    settings.refresh(db.inner()).await?;

    Ok(ImportReport {
        path: path.to_path_buf(),
        clients: summary.clients,
        catalog: summary.catalog,
        quotes: summary.quotes,
        next_sequence: summary.next_sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::client::{add_client, NewClient};
    use crate::commands::quote::{create_quote, list_quotes, NewQuote, QuoteFilter};
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;
    use crate::state::AppConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_then_import_into_fresh_db() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("backups").join("quotebook.json");

        let (source, source_settings) = state().await;
        let client = add_client(
            &source,
            NewClient {
                name: "Katherine Johnson".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        for _ in 0..2 {
            create_quote(
                &source,
                &source_settings,
                &AppConfig::default(),
                NewQuote {
                    client_id: client.id.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let exported = export_to_file(&source, &file).await.unwrap();
        assert_eq!(exported.quotes, 2);

        let (target, target_settings) = state().await;
        let imported = import_from_file(&target, &target_settings, &file)
            .await
            .unwrap();
        assert_eq!(imported.clients, 1);
        assert_eq!(imported.next_sequence, 3);
        assert_eq!(target_settings.snapshot().next_sequence, 3);

        assert_eq!(
            list_quotes(&source, QuoteFilter::default()).await.unwrap(),
            list_quotes(&target, QuoteFilter::default()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_import_garbage_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{ not json").unwrap();

        let (db, settings) = state().await;
        let err = import_from_file(&db, &settings, &file).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_import_missing_file_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let (db, settings) = state().await;

        let err = import_from_file(&db, &settings, &dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);
    }
}
