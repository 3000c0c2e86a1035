//! # Backup Repository
//!
//! Export and import of every collection as one [`ExportEnvelope`].
//!
//! ## Import Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  import_all(envelope)                                                   │
//! │                                                                         │
//! │  validate + reprice every quote      (outside the transaction)          │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │   ├── remember current next_sequence                                   │
//! │   ├── DELETE quote_items, quotes, clients, catalog_items, settings     │
//! │   ├── INSERT envelope clients, catalog, quotes (+items), settings      │
//! │   └── next_sequence = MAX(imported, remembered, max quote seq + 1)     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Replace, never merge. Any failure leaves the old data untouched.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keeping the remembered counter means an import can never make the app
//! hand out an ID it already handed out on this machine.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::{catalog, client, quote, settings};
use quotebook_core::{truncate_millis, ExportEnvelope};

/// Counts of what an import wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub clients: usize,
    pub catalog: usize,
    pub quotes: usize,
    /// Counter value after the import.
    pub next_sequence: i64,
}

/// Repository for export/import.
#[derive(Debug, Clone)]
pub struct BackupRepository {
    pool: SqlitePool,
}

impl BackupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BackupRepository { pool }
    }

    /// Reads every collection into an envelope stamped with `now`.
    ///
    /// All reads happen in one transaction, so the snapshot is consistent.
    pub async fn export_all(&self, now: DateTime<Utc>) -> DbResult<ExportEnvelope> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let clients = client::list_in(&mut tx).await?;
        let catalog = catalog::list_in(&mut tx).await?;
        let quotes = quote::list_in(&mut tx).await?;
        let settings = settings::get_in(&mut tx).await?.into_iter().collect();

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            clients = clients.len(),
            catalog = catalog.len(),
            quotes = quotes.len(),
            "Exported all collections"
        );

        Ok(ExportEnvelope {
            clients,
            quotes,
            settings,
            catalog,
            exported_at: truncate_millis(now),
        })
    }

    /// Replaces every local collection with the envelope's contents.
    ///
    /// ## Errors
    /// - `DbError::Validation` if any record breaks a business rule
    /// - `DbError::ForeignKeyViolation` if a quote names a client that is not
    ///   in the envelope
    /// - `DbError::UniqueViolation` on duplicate IDs within the envelope
    pub async fn import_all(&self, mut envelope: ExportEnvelope) -> DbResult<ImportSummary> {
        envelope.prepare_for_import()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let current_next = settings::get_in(&mut tx)
            .await?
            .map(|s| s.next_sequence)
            .unwrap_or(1);

        for table in ["quote_items", "quotes", "clients", "catalog_items", "settings"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        for record in &envelope.clients {
            client::put_in(&mut tx, record).await?;
        }
        for record in &envelope.catalog {
            catalog::put_in(&mut tx, record).await?;
        }
        for record in &envelope.quotes {
            quote::insert_in(&mut tx, record).await?;
        }

        let imported_settings = envelope.settings_record().cloned().unwrap_or_default();
        settings::put_in(&mut tx, &imported_settings).await?;

        let target = envelope.safe_next_sequence().max(current_next);
        let next_sequence = settings::raise_sequence_in(&mut tx, target).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let summary = ImportSummary {
            clients: envelope.clients.len(),
            catalog: envelope.catalog.len(),
            quotes: envelope.quotes.len(),
            next_sequence,
        };

        info!(
            clients = summary.clients,
            catalog = summary.catalog,
            quotes = summary.quotes,
            next_sequence = summary.next_sequence,
            "Imported backup"
        );

        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::{TimeZone, Utc};
    use quotebook_core::sequence::parse_quote_id;
    use quotebook_core::{
        CatalogItem, Client, ExportEnvelope, QuoteDraft, Settings, SettingsPatch, Theme,
    };

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seeded() -> Database {
        let db = db().await;
        let client = Client::new("Ada");
        db.clients().put(&client).await.unwrap();
        db.catalog().put(&CatalogItem::new("Mow", 45.0)).await.unwrap();
        db.settings()
            .update(SettingsPatch::default().business_name("Shipshape").theme(Theme::Dark))
            .await
            .unwrap();

        for qty in [1.0, 2.0, 3.0] {
            let mut draft = QuoteDraft::new(client.id.clone(), 0.08);
            draft.add_item("Mow", qty, 45.0);
            db.quotes().create(draft, Utc::now()).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_export_collects_everything() {
        let db = seeded().await;
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();

        let envelope = db.backup().export_all(at).await.unwrap();

        assert_eq!(envelope.clients.len(), 1);
        assert_eq!(envelope.catalog.len(), 1);
        assert_eq!(envelope.quotes.len(), 3);
        assert_eq!(envelope.settings.len(), 1);
        assert_eq!(envelope.settings[0].next_sequence, 4);
        assert_eq!(envelope.exported_at, at);
    }

    #[tokio::test]
    async fn test_export_then_import_reproduces_quotes() {
        let source = seeded().await;
        let envelope = source.backup().export_all(Utc::now()).await.unwrap();
        let json = envelope.to_json().unwrap();

        let target = db().await;
        let summary = target
            .backup()
            .import_all(ExportEnvelope::from_json(&json).unwrap())
            .await
            .unwrap();
        assert_eq!(summary.quotes, 3);
        assert_eq!(summary.next_sequence, 4);

        let before = source.quotes().list_ordered_by_creation().await.unwrap();
        let after = target.quotes().list_ordered_by_creation().await.unwrap();
        assert_eq!(before, after);

        let settings = target.settings().get().await.unwrap().unwrap();
        assert_eq!(settings.business_name, "Shipshape");
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_import_replaces_existing_data() {
        let db = seeded().await;
        let empty = ExportEnvelope {
            clients: vec![],
            quotes: vec![],
            settings: vec![],
            catalog: vec![],
            exported_at: Utc::now(),
        };

        db.backup().import_all(empty).await.unwrap();

        assert_eq!(db.clients().count().await.unwrap(), 0);
        assert_eq!(db.catalog().count().await.unwrap(), 0);
        assert_eq!(db.quotes().count().await.unwrap(), 0);
        assert_eq!(db.settings().get().await.unwrap().unwrap().business_name, "");
    }

    #[tokio::test]
    async fn test_import_never_lowers_counter() {
        let db = seeded().await;
        let old = ExportEnvelope {
            clients: vec![],
            quotes: vec![],
            settings: vec![Settings {
                next_sequence: 1,
                ..Default::default()
            }],
            catalog: vec![],
            exported_at: Utc::now(),
        };

        let summary = db.backup().import_all(old).await.unwrap();
        assert_eq!(summary.next_sequence, 4);

        let client = Client::new("Grace");
        db.clients().put(&client).await.unwrap();
        let quote = db
            .quotes()
            .create(QuoteDraft::new(client.id, 0.0), Utc::now())
            .await
            .unwrap();
        assert_eq!(parse_quote_id(&quote.id).unwrap().sequence, 4);
    }

    #[tokio::test]
    async fn test_import_recomputes_totals() {
        let source = seeded().await;
        let mut envelope = source.backup().export_all(Utc::now()).await.unwrap();
        envelope.quotes[0].total = 12345.0;

        let target = db().await;
        target.backup().import_all(envelope.clone()).await.unwrap();

        let stored = target
            .quotes()
            .get_by_id(&envelope.quotes[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total, 48.6);
    }

    #[tokio::test]
    async fn test_failed_import_leaves_data_untouched() {
        let db = seeded().await;
        let mut envelope = db.backup().export_all(Utc::now()).await.unwrap();
        // quote pointing at a client the envelope doesn't carry
        envelope.clients.clear();

        let result = db.backup().import_all(envelope).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));

        assert_eq!(db.clients().count().await.unwrap(), 1);
        assert_eq!(db.quotes().count().await.unwrap(), 3);
    }
}
