//! # Domain Types
//!
//! Core domain types used throughout Quotebook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Quote      │   │   CatalogItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  client_id      │   │  id (UUID)      │       │
//! │  │  name           │   │  id (q-DATE-N)  │   │  name           │       │
//! │  │  email, phone   │   │  status         │   │  unit_price     │       │
//! │  └─────────────────┘   │  items ─────────┼──►│  (snapshot src) │       │
//! │                        │  tax_rate       │   └─────────────────┘       │
//! │                        │  discount       │                             │
//! │                        │  subtotal/tax/  │   ┌─────────────────┐       │
//! │                        │  total (derived)│   │    Settings     │       │
//! │                        └─────────────────┘   │  next_sequence  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Shape
//! Field names are camelCase and timestamps are integer milliseconds since
//! the Unix epoch, which is the shape of the export envelope.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::pricing::{self, QuoteTotals};
use crate::SETTINGS_ID;

/// Returns the current time truncated to whole milliseconds.
///
/// Timestamps are persisted and exported with millisecond precision; cutting
/// the sub-millisecond part up front keeps export/import lossless.
pub fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}

/// Truncates a timestamp to whole milliseconds.
pub fn truncate_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(ts)
}

// =============================================================================
// Client
// =============================================================================

/// A customer of the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name (person or company). Required.
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Service address.
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a client with a fresh UUID and the current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_millis();
        Client {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A service offered by the business, used as a template for line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Service name shown on quotes.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Default price per unit, in currency units.
    #[serde(default)]
    pub unit_price: f64,

    /// Billing unit ("hour", "visit", "sq ft", ...).
    #[serde(default)]
    pub unit: Option<String>,

    /// Inactive services stay in the catalog but are hidden from pickers.
    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl CatalogItem {
    /// Creates an active catalog item with a fresh UUID.
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        let now = now_millis();
        CatalogItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            unit_price,
            unit: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One priced row within a quote.
///
/// Line items have no identity outside their quote. The `id` is assigned by
/// the caller and only needs to be unique within the quote. Missing numeric
/// fields deserialize as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub qty: f64,

    /// Price per unit, in currency units.
    #[serde(default)]
    pub unit_price: f64,

    /// Derived: `round2(qty × unit_price)`.
    #[serde(default)]
    pub total: f64,

    /// Advisory text shown next to the row (never blocks saving).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl LineItem {
    /// Creates a priced line item.
    pub fn new(id: impl Into<String>, description: impl Into<String>, qty: f64, unit_price: f64) -> Self {
        LineItem {
            id: id.into(),
            description: description.into(),
            qty,
            unit_price,
            total: pricing::round2(qty * unit_price),
            warning: None,
        }
    }

    /// Creates a line item from a catalog service.
    ///
    /// ## Snapshot Pattern
    /// Name and price are copied at the time the service is added, so later
    /// catalog edits never change an existing quote.
    pub fn from_catalog(id: impl Into<String>, item: &CatalogItem, qty: f64) -> Self {
        let mut line = LineItem::new(id, item.name.clone(), qty, item.unit_price);
        if !item.active {
            line.warning = Some(format!("'{}' is no longer offered", item.name));
        }
        line
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// Where a quote is in the job lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Sent to the client, waiting for an answer.
    #[default]
    Pending,
    Approved,
    Scheduled,
    InProgress,
    Completed,
    Canceled,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 6] = [
        QuoteStatus::Pending,
        QuoteStatus::Approved,
        QuoteStatus::Scheduled,
        QuoteStatus::InProgress,
        QuoteStatus::Completed,
        QuoteStatus::Canceled,
    ];

    /// Returns the wire name (`"in_progress"`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Scheduled => "scheduled",
            QuoteStatus::InProgress => "in_progress",
            QuoteStatus::Completed => "completed",
            QuoteStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!(
                    "'{}' is not one of: {}",
                    s,
                    QuoteStatus::ALL.map(|st| st.as_str()).join(", ")
                ),
            })
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A priced offer to a client.
///
/// ## Invariant
/// `subtotal`, `tax` and `total` are derived from `items`, `tax_rate` and
/// `discount` via [`pricing::reprice`]. They are never hand-edited; every
/// save path recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// `q-YYYYMMDD-NNNN`, allocated once at creation.
    pub id: String,

    /// Reference to a [`Client`] (not owned).
    pub client_id: String,

    #[serde(default)]
    pub status: QuoteStatus,

    /// Display order is significant, pricing order is not.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Fraction, e.g. `0.08` for 8%.
    #[serde(default)]
    pub tax_rate: f64,

    /// Flat amount in currency units.
    #[serde(default)]
    pub discount: f64,

    #[serde(default)]
    pub subtotal: f64,

    #[serde(default)]
    pub tax: f64,

    #[serde(default)]
    pub total: f64,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Returns the derived amounts as stored on the quote.
    pub fn totals(&self) -> QuoteTotals {
        QuoteTotals {
            subtotal: self.subtotal,
            tax: self.tax,
            total: self.total,
        }
    }
}

// =============================================================================
// Quote Draft
// =============================================================================

/// A quote being edited before it has an ID.
///
/// This is the editor's working copy: items can be added, re-quantified and
/// removed, and totals are available at any time. Turning it into a
/// [`Quote`] needs the ID minted by the sequence allocator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub client_id: String,

    #[serde(default)]
    pub status: QuoteStatus,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub tax_rate: f64,

    #[serde(default)]
    pub discount: f64,

    #[serde(default)]
    pub notes: Option<String>,
}

impl QuoteDraft {
    /// Starts a draft for a client.
    pub fn new(client_id: impl Into<String>, tax_rate: f64) -> Self {
        QuoteDraft {
            client_id: client_id.into(),
            tax_rate,
            ..Default::default()
        }
    }

    /// Appends a free-form line item. Returns its id.
    pub fn add_item(&mut self, description: impl Into<String>, qty: f64, unit_price: f64) -> String {
        let id = self.next_item_id();
        self.items.push(LineItem::new(id.clone(), description, qty, unit_price));
        id
    }

    /// Appends a line item copied from a catalog service. Returns its id.
    pub fn add_catalog_item(&mut self, item: &CatalogItem, qty: f64) -> String {
        let id = self.next_item_id();
        self.items.push(LineItem::from_catalog(id.clone(), item, qty));
        id
    }

    /// Changes the quantity of one item and re-prices it.
    ///
    /// Returns `false` when no item has that id.
    pub fn set_quantity(&mut self, item_id: &str, qty: f64) -> bool {
        match self.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.qty = qty;
                *item = pricing::compute_item_total(item);
                true
            }
            None => false,
        }
    }

    /// Removes an item. Returns `false` when no item has that id.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != before
    }

    /// Prices the draft as it stands.
    pub fn totals(&self) -> QuoteTotals {
        let items = pricing::price_items(&self.items);
        pricing::compute_quote_totals(&items, self.tax_rate, self.discount)
    }

    /// Builds the quote under an allocated ID, pricing it on the way.
    pub fn into_quote(self, id: impl Into<String>, now: DateTime<Utc>) -> Quote {
        let now = truncate_millis(now);
        let mut quote = Quote {
            id: id.into(),
            client_id: self.client_id,
            status: self.status,
            items: self.items,
            tax_rate: self.tax_rate,
            discount: self.discount,
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        };
        pricing::reprice(&mut quote);
        quote
    }

    /// One past the highest numeric item id. When that would overflow, the
    /// smallest positive id no item uses.
    fn next_item_id(&self) -> String {
        let used: Vec<u64> = self
            .items
            .iter()
            .filter_map(|i| i.id.parse::<u64>().ok())
            .collect();

        let next = match used.iter().max().copied().unwrap_or(0).checked_add(1) {
            Some(next) => next,
            None => (1..).find(|n| !used.contains(n)).unwrap_or(1),
        };
        next.to_string()
    }
}

// =============================================================================
// Settings
// =============================================================================

/// UI color scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system.
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" | "auto" => Ok(Theme::System),
            other => Err(ValidationError::InvalidFormat {
                field: "theme".to_string(),
                reason: format!("'{}' is not one of: light, dark, system", other),
            }),
        }
    }
}

/// Business profile and app-wide preferences. There is exactly one record.
///
/// `next_sequence` feeds quote IDs. It only ever grows; see the sequence
/// allocator in quotebook-db.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_settings_id")]
    pub id: String,

    #[serde(default)]
    pub business_name: String,

    #[serde(default)]
    pub business_email: Option<String>,

    #[serde(default)]
    pub business_phone: Option<String>,

    #[serde(default)]
    pub business_address: Option<String>,

    /// Tax rate pre-filled on new quotes (fraction).
    #[serde(default)]
    pub default_tax_rate: f64,

    #[serde(default)]
    pub theme: Theme,

    /// Sequence number the next quote ID will carry.
    #[serde(default = "default_next_sequence")]
    pub next_sequence: i64,
}

fn default_settings_id() -> String {
    SETTINGS_ID.to_string()
}

fn default_next_sequence() -> i64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            id: default_settings_id(),
            business_name: String::new(),
            business_email: None,
            business_phone: None,
            business_address: None,
            default_tax_rate: 0.0,
            theme: Theme::default(),
            next_sequence: default_next_sequence(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
