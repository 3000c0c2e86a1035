//! # Quote Commands
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quotebook quote new <client> --service <id>:2 --item "Haul away:1:35"  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  client exists?  ──no──► NOT_FOUND                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QuoteDraft  ◄── catalog snapshots + free-form rows                     │
//! │       │          tax rate: --tax-rate, else config, else settings       │
//! │       ▼                                                                 │
//! │  db.quotes().create(draft)   ID minted + insert in one transaction     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SettingsState refreshed (next_sequence moved)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppConfig, DbState, SettingsState};
use quotebook_core::{CoreError, Quote, QuoteDraft, QuotePatch, QuoteStatus};

/// One line item requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemInput {
    /// Copy a catalog service.
    Catalog { catalog_id: String, qty: f64 },

    /// Free-form row.
    Custom {
        description: String,
        qty: f64,
        unit_price: f64,
    },
}

/// Input for `quote new`.
#[derive(Debug, Clone, Default)]
pub struct NewQuote {
    pub client_id: String,
    pub items: Vec<ItemInput>,
    /// Falls back to the config override, then the business default.
    pub tax_rate: Option<f64>,
    pub discount: f64,
    pub status: Option<QuoteStatus>,
    pub notes: Option<String>,
}

/// Input for `quote edit`.
#[derive(Debug, Clone, Default)]
pub struct QuoteEdit {
    pub client_id: Option<String>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub notes: Option<String>,
    pub clear_notes: bool,
    pub add_items: Vec<ItemInput>,
    pub remove_items: Vec<String>,
    /// `(line item id, new quantity)`
    pub set_quantities: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    pub client_id: Option<String>,
    pub status: Option<QuoteStatus>,
}

/// One row of a quote listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub id: String,
    pub client_id: String,
    pub status: QuoteStatus,
    pub item_count: usize,
    pub total: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl From<&Quote> for QuoteSummary {
    fn from(q: &Quote) -> Self {
        QuoteSummary {
            id: q.id.clone(),
            client_id: q.client_id.clone(),
            status: q.status,
            item_count: q.items.len(),
            total: q.total,
            created_at: q.created_at,
        }
    }
}

pub async fn create_quote(
    db: &DbState,
    settings: &SettingsState,
    config: &AppConfig,
    input: NewQuote,
) -> ApiResult<Quote> {
    let client_id = input.client_id.trim();
    db.inner()
        .clients()
        .get_by_id(client_id)
        .await?
        .ok_or_else(|| CoreError::ClientNotFound(client_id.to_string()))?;

    let tax_rate = match input.tax_rate {
        Some(rate) => rate,
        None => settings.with_settings(|s| config.effective_tax_rate(s)),
    };

    let mut draft = QuoteDraft::new(client_id, tax_rate);
    draft.discount = input.discount;
    draft.status = input.status.unwrap_or_default();
    draft.notes = input.notes;
    add_items(db, &mut draft, input.items).await?;

    debug!(
        client_id = %draft.client_id,
        items = draft.items.len(),
        total = draft.totals().total,
        "Creating quote"
    );

    let quote = db.inner().quotes().create(draft, Utc::now()).await?;
    settings.refresh(db.inner()).await?;

    Ok(quote)
}

/// Quotes oldest first, optionally narrowed to one client or status.
pub async fn list_quotes(db: &DbState, filter: QuoteFilter) -> ApiResult<Vec<Quote>> {
    let quotes = match &filter.client_id {
        Some(client_id) => db.inner().quotes().list_for_client(client_id).await?,
        None => db.inner().quotes().list_ordered_by_creation().await?,
    };

    Ok(quotes
        .into_iter()
        .filter(|q| filter.status.map_or(true, |s| q.status == s))
        .collect())
}

pub async fn get_quote(db: &DbState, id: &str) -> ApiResult<Quote> {
    db.inner()
        .quotes()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::QuoteNotFound(id.to_string()).into())
}

pub async fn set_quote_status(db: &DbState, id: &str, status: QuoteStatus) -> ApiResult<Quote> {
    let quote = db.inner().quotes().set_status(id, status, Utc::now()).await?;
    info!(id = %quote.id, status = %quote.status, "Quote status changed");
    Ok(quote)
}

/// Edits header fields and changes, adds or removes rows. Totals are
/// recomputed. Row edits apply in that order, so a new row cannot be
/// referenced by number in the same call.
pub async fn update_quote(db: &DbState, id: &str, edit: QuoteEdit) -> ApiResult<Quote> {
    let mut patch = QuotePatch::default();

    if let Some(client_id) = edit.client_id {
        db.inner()
            .clients()
            .get_by_id(&client_id)
            .await?
            .ok_or_else(|| CoreError::ClientNotFound(client_id.clone()))?;
        patch = patch.client_id(client_id);
    }
    if let Some(rate) = edit.tax_rate {
        patch = patch.tax_rate(rate);
    }
    if let Some(discount) = edit.discount {
        patch = patch.discount(discount);
    }
    if edit.clear_notes {
        patch = patch.clear_notes();
    } else if let Some(notes) = edit.notes {
        patch = patch.notes(notes);
    }

    let edits_rows = !edit.add_items.is_empty()
        || !edit.remove_items.is_empty()
        || !edit.set_quantities.is_empty();

    if edits_rows {
        let current = get_quote(db, id).await?;
        let mut draft = QuoteDraft {
            items: current.items,
            ..Default::default()
        };

        for (item_id, qty) in &edit.set_quantities {
            if !draft.set_quantity(item_id, *qty) {
                return Err(ApiError::not_found("Line item", item_id));
            }
        }
        for item_id in &edit.remove_items {
            if !draft.remove_item(item_id) {
                return Err(ApiError::not_found("Line item", item_id));
            }
        }
        add_items(db, &mut draft, edit.add_items).await?;
        patch = patch.items(draft.items);
    }

    if patch.is_empty() {
        return Err(ApiError::validation("Nothing to update"));
    }

    Ok(db.inner().quotes().update(id, patch, Utc::now()).await?)
}

/// Deletes a quote. Its number is never handed out again.
pub async fn delete_quote(db: &DbState, id: &str) -> ApiResult<()> {
    db.inner().quotes().delete(id).await?;
    info!(id = %id, "Quote deleted");
    Ok(())
}

async fn add_items(db: &DbState, draft: &mut QuoteDraft, items: Vec<ItemInput>) -> ApiResult<()> {
    for input in items {
        match input {
            ItemInput::Catalog { catalog_id, qty } => {
                let service = db
                    .inner()
                    .catalog()
                    .get_by_id(&catalog_id)
                    .await?
                    .ok_or(CoreError::CatalogItemNotFound(catalog_id))?;
                draft.add_catalog_item(&service, qty);
            }
            ItemInput::Custom {
                description,
                qty,
                unit_price,
            } => {
                draft.add_item(description, qty, unit_price);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::client::{add_client, NewClient};
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;
    use quotebook_core::sequence::{local_date, parse_quote_id};
    use quotebook_core::{CatalogItem, SettingsPatch};

    async fn client(db: &DbState) -> String {
        add_client(
            db,
            NewClient {
                name: "Grace Hopper".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    fn gutters() -> ItemInput {
        ItemInput::Custom {
            description: "Gutter cleaning".into(),
            qty: 2.0,
            unit_price: 120.0,
        }
    }

    #[tokio::test]
    async fn test_create_prices_and_numbers_quote() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;

        let quote = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id,
                items: vec![gutters()],
                tax_rate: Some(0.08),
                discount: 10.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(quote.subtotal, 240.0);
        assert_eq!(quote.tax, 19.2);
        assert_eq!(quote.total, 249.2);

        let id = parse_quote_id(&quote.id).unwrap();
        assert_eq!(id.sequence, 1);
        assert_eq!(id.date, local_date(quote.created_at));
        assert_eq!(settings.snapshot().next_sequence, 2);
    }

    #[tokio::test]
    async fn test_tax_rate_falls_back_to_settings_then_config() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;
        db.inner()
            .settings()
            .update(SettingsPatch::default().default_tax_rate(0.05))
            .await
            .unwrap();
        settings.refresh(db.inner()).await.unwrap();

        let input = NewQuote {
            client_id,
            items: vec![gutters()],
            ..Default::default()
        };

        let from_settings = create_quote(&db, &settings, &AppConfig::default(), input.clone())
            .await
            .unwrap();
        assert_eq!(from_settings.tax_rate, 0.05);

        let config = AppConfig {
            default_tax_rate: Some(0.1),
            ..Default::default()
        };
        let from_config = create_quote(&db, &settings, &config, input).await.unwrap();
        assert_eq!(from_config.tax_rate, 0.1);
        assert_eq!(from_config.tax, 24.0);
    }

    #[tokio::test]
    async fn test_catalog_item_is_snapshotted() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;
        let mut retired = CatalogItem::new("Chimney sweep", 150.0);
        retired.active = false;
        db.inner().catalog().put(&retired).await.unwrap();

        let quote = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id,
                items: vec![ItemInput::Catalog {
                    catalog_id: retired.id.clone(),
                    qty: 1.0,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(quote.items[0].description, "Chimney sweep");
        assert_eq!(quote.items[0].unit_price, 150.0);
        assert!(quote.items[0].warning.is_some());
    }

    #[tokio::test]
    async fn test_unknown_client_does_not_consume_number() {
        let (db, settings) = state().await;

        let err = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id: "ghost".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(db.inner().settings().peek_next_sequence().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_catalog_item_is_not_found() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;

        let err = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id,
                items: vec![ItemInput::Catalog {
                    catalog_id: "nope".into(),
                    qty: 1.0,
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("Catalog item"));
    }

    #[tokio::test]
    async fn test_filter_by_status() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;
        let config = AppConfig::default();
        let input = NewQuote {
            client_id,
            ..Default::default()
        };

        let first = create_quote(&db, &settings, &config, input.clone()).await.unwrap();
        create_quote(&db, &settings, &config, input).await.unwrap();
        set_quote_status(&db, &first.id, QuoteStatus::Approved)
            .await
            .unwrap();

        let approved = list_quotes(
            &db,
            QuoteFilter {
                status: Some(QuoteStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, first.id);

        assert_eq!(list_quotes(&db, QuoteFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_edit_adds_and_removes_items() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;
        let quote = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id,
                items: vec![gutters()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let edited = update_quote(
            &db,
            &quote.id,
            QuoteEdit {
                remove_items: vec!["1".into()],
                add_items: vec![ItemInput::Custom {
                    description: "Haul away".into(),
                    qty: 1.0,
                    unit_price: 35.0,
                }],
                discount: Some(5.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.items.len(), 1);
        assert_eq!(edited.items[0].description, "Haul away");
        assert_eq!(edited.subtotal, 35.0);
        assert_eq!(edited.total, 30.0);
        assert_eq!(get_quote(&db, &quote.id).await.unwrap(), edited);
    }

    #[tokio::test]
    async fn test_edit_quantity_reprices() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;
        let quote = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id,
                items: vec![gutters()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let edited = update_quote(
            &db,
            &quote.id,
            QuoteEdit {
                set_quantities: vec![("1".into(), 3.0)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.items[0].qty, 3.0);
        assert_eq!(edited.items[0].total, 360.0);
        assert_eq!(edited.subtotal, 360.0);

        let err = update_quote(
            &db,
            &quote.id,
            QuoteEdit {
                set_quantities: vec![("9".into(), 1.0)],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_edit_nothing_rejected() {
        let (db, _) = state().await;
        let err = update_quote(&db, "q-20250307-0001", QuoteEdit::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_delete_then_show_is_not_found() {
        let (db, settings) = state().await;
        let client_id = client(&db).await;
        let quote = create_quote(
            &db,
            &settings,
            &AppConfig::default(),
            NewQuote {
                client_id,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        delete_quote(&db, &quote.id).await.unwrap();
        assert_eq!(get_quote(&db, &quote.id).await.unwrap_err().code, ErrorCode::NotFound);
    }
}
