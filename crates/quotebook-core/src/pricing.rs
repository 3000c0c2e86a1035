//! # Pricing Engine
//!
//! Deterministic arithmetic over quote data. No I/O, no side effects.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote Pricing                                    │
//! │                                                                         │
//! │  LineItem { qty: 3, unit_price: 19.99 }                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_item_total() ──► total = round2(3 × 19.99) = 59.97            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_quote_totals(items, tax_rate, discount)                       │
//! │       ├── subtotal = round2(Σ item.total)                              │
//! │       ├── tax      = round2(subtotal × tax_rate)                       │
//! │       └── total    = round2(subtotal + tax − discount)                 │
//! │                                                                         │
//! │  `total` is NOT clamped: a discount bigger than subtotal + tax         │
//! │  yields a negative total (a credit).                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Rule
//! `0.1 + 0.2` is `0.30000000000000004` in binary floating point. Scaling to
//! cents and rounding removes that drift. The `ε` nudge is part of the
//! canonical rule: every component must round identically so stored totals
//! agree to the cent.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{LineItem, Quote};

/// Quote-level amounts derived from the line items, tax rate and discount.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Rounds to 2 decimal places: `round(n × 100 + ε) / 100`.
///
/// `round` is half away from zero.
///
/// ## Example
/// ```rust
/// use quotebook_core::pricing::round2;
///
/// assert_eq!(round2(0.1 + 0.2), 0.3);
/// assert_eq!(round2(59.969999999999995), 59.97);
/// assert_eq!(round2(-2.5), -2.5);
/// ```
#[inline]
pub fn round2(n: f64) -> f64 {
    (n * 100.0 + f64::EPSILON).round() / 100.0
}

/// Returns a copy of `item` with `total = round2(qty × unit_price)`.
///
/// Signs are not checked: a negative quantity or price is a legitimate
/// credit line and simply produces a negative total.
pub fn compute_item_total(item: &LineItem) -> LineItem {
    LineItem {
        total: round2(item.qty * item.unit_price),
        ..item.clone()
    }
}

/// Computes subtotal, tax and total from the *stored* item totals.
///
/// Item totals are taken as they are. Call [`compute_item_total`] (or
/// [`price_items`]) first if items were just edited.
pub fn compute_quote_totals(items: &[LineItem], tax_rate: f64, discount: f64) -> QuoteTotals {
    let subtotal = round2(items.iter().map(|item| item.total).sum());
    let tax = round2(subtotal * tax_rate);
    let total = round2(subtotal + tax - discount);

    QuoteTotals {
        subtotal,
        tax,
        total,
    }
}

/// Recomputes every item's total.
pub fn price_items(items: &[LineItem]) -> Vec<LineItem> {
    items.iter().map(compute_item_total).collect()
}

/// Recomputes item totals and the quote's derived amounts in place.
///
/// Every path that saves a quote goes through this function.
pub fn reprice(quote: &mut Quote) {
    for item in quote.items.iter_mut() {
        item.total = round2(item.qty * item.unit_price);
    }

    let totals = compute_quote_totals(&quote.items, quote.tax_rate, quote.discount);
    quote.subtotal = totals.subtotal;
    quote.tax = totals.tax;
    quote.total = totals.total;
}

// =============================================================================
// Unit Tests
// =============================================================================
