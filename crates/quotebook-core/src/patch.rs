//! # Partial Updates
//!
//! Explicit patch types for editing stored records.
//!
//! Every mutable field is an `Option`: `None` leaves the field alone. Fields
//! that can themselves be cleared (email, notes, ...) are
//! `Option<Option<String>>`, so `Some(None)` clears and `Some(Some(v))` sets.
//!
//! ```rust
//! use quotebook_core::{Client, ClientPatch};
//! use chrono::Utc;
//!
//! let mut client = Client::new("Ada Lovelace");
//! client.email = Some("ada@old.example".into());
//!
//! ClientPatch::default()
//!     .phone("555-0100")
//!     .clear_email()
//!     .apply(&mut client, Utc::now());
//!
//! assert_eq!(client.phone.as_deref(), Some("555-0100"));
//! assert!(client.email.is_none());
//! ```
//!
//! IDs, creation timestamps and the quote-number counter are not patchable.

use chrono::{DateTime, Utc};

use crate::pricing;
use crate::types::{
    truncate_millis, CatalogItem, Client, LineItem, Quote, QuoteStatus, Settings, Theme,
};

/// Sets `*target` when the patch carries a value.
fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

// =============================================================================
// Client Patch
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl ClientPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(Some(email.into()));
        self
    }

    pub fn clear_email(mut self) -> Self {
        self.email = Some(None);
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(Some(phone.into()));
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(Some(address.into()));
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == ClientPatch::default()
    }

    /// Applies the patch and bumps `updated_at`.
    pub fn apply(self, client: &mut Client, now: DateTime<Utc>) {
        set(&mut client.name, self.name);
        set(&mut client.email, self.email);
        set(&mut client.phone, self.phone);
        set(&mut client.address, self.address);
        set(&mut client.notes, self.notes);
        client.updated_at = truncate_millis(now);
    }
}

// =============================================================================
// Catalog Item Patch
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogItemPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub unit_price: Option<f64>,
    pub unit: Option<Option<String>>,
    pub active: Option<bool>,
}

impl CatalogItemPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(Some(unit.into()));
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == CatalogItemPatch::default()
    }

    /// Applies the patch and bumps `updated_at`.
    ///
    /// Quotes already holding this service keep their snapshot price.
    pub fn apply(self, item: &mut CatalogItem, now: DateTime<Utc>) {
        set(&mut item.name, self.name);
        set(&mut item.description, self.description);
        set(&mut item.unit_price, self.unit_price);
        set(&mut item.unit, self.unit);
        set(&mut item.active, self.active);
        item.updated_at = truncate_millis(now);
    }
}

// =============================================================================
// Quote Patch
// =============================================================================

/// Edits to an existing quote.
///
/// The quote ID is fixed at creation. Derived totals are recomputed by
/// [`QuotePatch::apply`] regardless of which fields changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotePatch {
    pub client_id: Option<String>,
    pub status: Option<QuoteStatus>,
    pub items: Option<Vec<LineItem>>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub notes: Option<Option<String>>,
}

impl QuotePatch {
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn status(mut self, status: QuoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn items(mut self, items: Vec<LineItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn tax_rate(mut self, tax_rate: f64) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == QuotePatch::default()
    }

    /// Applies the patch, reprices the quote and bumps `updated_at`.
    pub fn apply(self, quote: &mut Quote, now: DateTime<Utc>) {
        set(&mut quote.client_id, self.client_id);
        set(&mut quote.status, self.status);
        set(&mut quote.items, self.items);
        set(&mut quote.tax_rate, self.tax_rate);
        set(&mut quote.discount, self.discount);
        set(&mut quote.notes, self.notes);
        pricing::reprice(quote);
        quote.updated_at = truncate_millis(now);
    }
}

// =============================================================================
// Settings Patch
// =============================================================================

/// Edits to the business profile and preferences.
///
/// `next_sequence` is deliberately absent: only the quote ID allocator
/// advances it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub business_name: Option<String>,
    pub business_email: Option<Option<String>>,
    pub business_phone: Option<Option<String>>,
    pub business_address: Option<Option<String>>,
    pub default_tax_rate: Option<f64>,
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    pub fn business_name(mut self, name: impl Into<String>) -> Self {
        self.business_name = Some(name.into());
        self
    }

    pub fn business_email(mut self, email: impl Into<String>) -> Self {
        self.business_email = Some(Some(email.into()));
        self
    }

    pub fn business_phone(mut self, phone: impl Into<String>) -> Self {
        self.business_phone = Some(Some(phone.into()));
        self
    }

    pub fn business_address(mut self, address: impl Into<String>) -> Self {
        self.business_address = Some(Some(address.into()));
        self
    }

    pub fn default_tax_rate(mut self, rate: f64) -> Self {
        self.default_tax_rate = Some(rate);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    pub fn apply(self, settings: &mut Settings) {
        set(&mut settings.business_name, self.business_name);
        set(&mut settings.business_email, self.business_email);
        set(&mut settings.business_phone, self.business_phone);
        set(&mut settings.business_address, self.business_address);
        set(&mut settings.default_tax_rate, self.default_tax_rate);
        set(&mut settings.theme, self.theme);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_patch_only_touches_timestamp() {
        let mut client = Client::new("Grace");
        let before = client.clone();

        let patch = ClientPatch::default();
        assert!(patch.is_empty());
        patch.apply(&mut client, later());

        assert_eq!(client.name, before.name);
        assert_eq!(client.created_at, before.created_at);
        assert_eq!(client.updated_at, later());
    }

    #[test]
    fn test_client_patch_sets_and_clears() {
        let mut client = Client::new("Grace");
        client.notes = Some("Gate code 1234".to_string());

        ClientPatch {
            notes: Some(None),
            ..Default::default()
        }
        .name("Grace Hopper")
        .address("1 Navy Way")
        .apply(&mut client, later());

        assert_eq!(client.name, "Grace Hopper");
        assert_eq!(client.address.as_deref(), Some("1 Navy Way"));
        assert!(client.notes.is_none());
    }

    #[test]
    fn test_catalog_patch() {
        let mut item = CatalogItem::new("Gutter cleaning", 120.0);
        CatalogItemPatch::default()
            .unit_price(135.0)
            .active(false)
            .apply(&mut item, later());

        assert_eq!(item.name, "Gutter cleaning");
        assert_eq!(item.unit_price, 135.0);
        assert!(!item.active);
    }

    #[test]
    fn test_quote_patch_reprices() {
        let mut draft = crate::types::QuoteDraft::new("c1", 0.0);
        draft.add_item("Mow", 1.0, 50.0);
        let mut quote = draft.into_quote("q-20250307-0001", later());
        assert_eq!(quote.total, 50.0);

        QuotePatch::default()
            .tax_rate(0.1)
            .discount(5.0)
            .status(QuoteStatus::Approved)
            .apply(&mut quote, later());

        assert_eq!(quote.status, QuoteStatus::Approved);
        assert_eq!(quote.subtotal, 50.0);
        assert_eq!(quote.tax, 5.0);
        assert_eq!(quote.total, 50.0);
        assert_eq!(quote.id, "q-20250307-0001");
    }

    #[test]
    fn test_quote_patch_replaces_items() {
        let mut draft = crate::types::QuoteDraft::new("c1", 0.0);
        draft.add_item("Mow", 1.0, 50.0);
        let mut quote = draft.into_quote("q-20250307-0001", later());

        // stale total on purpose: apply must recompute it
        let mut item = LineItem::new("9", "Aerate", 2.0, 40.0);
        item.total = 1.0;
        QuotePatch::default().items(vec![item]).apply(&mut quote, later());

        assert_eq!(quote.items.len(), 1);
        assert_eq!(quote.items[0].total, 80.0);
        assert_eq!(quote.total, 80.0);
    }

    #[test]
    fn test_settings_patch_leaves_counter_alone() {
        let mut settings = Settings {
            next_sequence: 17,
            ..Default::default()
        };
        SettingsPatch::default()
            .business_name("Shipshape Gutters")
            .default_tax_rate(0.0825)
            .theme(Theme::Dark)
            .apply(&mut settings);

        assert_eq!(settings.business_name, "Shipshape Gutters");
        assert_eq!(settings.default_tax_rate, 0.0825);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.next_sequence, 17);
    }
}
