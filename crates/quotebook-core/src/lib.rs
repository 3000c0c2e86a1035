//! # quotebook-core: Pure Business Logic for Quotebook
//!
//! This crate holds the quoting rules of Quotebook as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quotebook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI layer (CLI today)                         │   │
//! │  │    Client form ──► Quote editor ──► Export / Import            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ quotebook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │ pricing │ │ sequence │ │ patch  │ │validation│ │   │
//! │  │   │  Quote  │ │ round2  │ │ q-DATE-N │ │ Client │ │  rules  │  │   │
//! │  │   │ Client  │ │ totals  │ │  format  │ │ Quote  │ │ checks  │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  quotebook-db (Database Layer)                  │   │
//! │  │        SQLite record store, sequence counter, migrations        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, CatalogItem, Quote, LineItem, Settings)
//! - [`pricing`] - Line-item and quote totals, `round2`
//! - [`sequence`] - Human-readable quote ID formatting and parsing
//! - [`money`] - Cent-based view of currency amounts for storage and display
//! - [`patch`] - Explicit partial-update types
//! - [`backup`] - Export/import JSON envelope
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use quotebook_core::pricing::{compute_item_total, compute_quote_totals};
//! use quotebook_core::LineItem;
//!
//! let item = compute_item_total(&LineItem::new("1", "Gutter cleaning", 3.0, 19.99));
//! assert_eq!(item.total, 59.97);
//!
//! let totals = compute_quote_totals(&[item], 0.08, 0.0);
//! assert_eq!(totals.tax, 4.8);
//! assert_eq!(totals.total, 64.77);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod money;
pub mod patch;
pub mod pricing;
pub mod sequence;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use backup::ExportEnvelope;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use patch::{CatalogItemPatch, ClientPatch, QuotePatch, SettingsPatch};
pub use pricing::QuoteTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key of the single settings record.
pub const SETTINGS_ID: &str = "default";

/// Maximum length of a client or catalog item name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum number of line items on one quote.
///
/// ## Business Reason
/// Keeps printed quotes to a sane number of pages.
pub const MAX_QUOTE_ITEMS: usize = 200;
