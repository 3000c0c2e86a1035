//! # Export Envelope
//!
//! The JSON document used for full backups and for moving data between
//! machines.
//!
//! ```json
//! {
//!   "clients":  [ ... ],
//!   "quotes":   [ ... ],
//!   "settings": [ { "id": "default", "nextSequence": 43, ... } ],
//!   "catalog":  [ ... ],
//!   "exportedAt": 1741305600123
//! }
//! ```
//!
//! `settings` is a list to mirror the other collections; it holds zero or
//! one record in practice. Collections missing from the document read as
//! empty, so envelopes written before the catalog existed still import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::pricing;
use crate::sequence::parse_quote_id;
use crate::types::{CatalogItem, Client, Quote, Settings};
use crate::validation::{self, ValidationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    #[serde(default)]
    pub clients: Vec<Client>,

    #[serde(default)]
    pub quotes: Vec<Quote>,

    #[serde(default)]
    pub settings: Vec<Settings>,

    #[serde(default)]
    pub catalog: Vec<CatalogItem>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub exported_at: DateTime<Utc>,
}

impl ExportEnvelope {
    /// Serializes as pretty-printed JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses an envelope.
    ///
    /// ## Errors
    /// `CoreError::Envelope` if the text is not a valid envelope.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The settings record carried by the envelope, if any.
    pub fn settings_record(&self) -> Option<&Settings> {
        self.settings.first()
    }

    /// Highest sequence number among the carried quote IDs.
    ///
    /// IDs that don't parse (hand-edited files) are ignored.
    pub fn max_quote_sequence(&self) -> Option<i64> {
        self.quotes
            .iter()
            .filter_map(|q| parse_quote_id(&q.id).ok())
            .map(|id| id.sequence)
            .max()
    }

    /// Counter value that cannot collide with any imported quote.
    ///
    /// `max(settings.next_sequence, highest imported sequence + 1)`.
    pub fn safe_next_sequence(&self) -> i64 {
        let from_settings = self.settings_record().map(|s| s.next_sequence).unwrap_or(1);
        let from_quotes = self.max_quote_sequence().map(|seq| seq + 1).unwrap_or(1);
        from_settings.max(from_quotes).max(1)
    }

    /// Recomputes derived quote totals and validates every record.
    ///
    /// Import is a save path, so totals in the file are never trusted.
    pub fn prepare_for_import(&mut self) -> ValidationResult<()> {
        for client in &self.clients {
            validation::validate_client(client)?;
        }
        for item in &self.catalog {
            validation::validate_catalog_item(item)?;
        }
        for quote in self.quotes.iter_mut() {
            validation::validate_quote(quote)?;
            pricing::reprice(quote);
        }
        for settings in &self.settings {
            validation::validate_settings(settings)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
