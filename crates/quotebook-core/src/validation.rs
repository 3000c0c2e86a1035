//! # Validation Module
//!
//! Business rule validation for records before they are written.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI (CLI argument parsing)                                    │
//! │  └── Types: numbers parse, statuses are known words                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required names, length limits                                     │
//! │  └── Rates in range, non-negative prices                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign keys (quote → client)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation never rounds or rewrites values; it only accepts or rejects.
//! Line-item quantities and prices are not sign-checked here because
//! negative lines are valid credits.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{CatalogItem, Client, LineItem, Quote, QuoteDraft, Settings};
use crate::{MAX_NAME_LEN, MAX_QUOTE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required, length-limited name.
///
/// ## Example
/// ```rust
/// use quotebook_core::validation::validate_name;
///
/// assert!(validate_name("name", "Shipshape Gutters").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// Only a sanity check: something before and after a single `@`.
pub fn validate_email(field: &str, email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not an email address", email),
        }),
    }
}

/// Validates a tax rate expressed as a fraction.
///
/// ## Rules
/// - Finite
/// - Between 0 and 1 inclusive (`0.08` is 8%; `8.0` is a typo)
pub fn validate_tax_rate(rate: f64) -> ValidationResult<()> {
    validate_finite("tax_rate", rate)?;

    if !(0.0..=1.0).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0.0,
            max: 1.0,
        });
    }

    Ok(())
}

/// Validates a finite, non-negative amount (discount, catalog price).
pub fn validate_non_negative(field: &str, amount: f64) -> ValidationResult<()> {
    validate_finite(field, amount)?;

    if amount < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_client(client: &Client) -> ValidationResult<()> {
    validate_name("name", &client.name)?;
    validate_email("email", client.email.as_deref())?;
    Ok(())
}

pub fn validate_catalog_item(item: &CatalogItem) -> ValidationResult<()> {
    validate_name("name", &item.name)?;
    validate_non_negative("unit_price", item.unit_price)?;
    Ok(())
}

/// Validates the line items of a quote.
///
/// ## Rules
/// - At most [`MAX_QUOTE_ITEMS`] items
/// - Item ids are non-empty and unique within the quote
/// - Quantities and prices are finite (sign is free)
/// - Each line total and their sum stay finite
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.len() > MAX_QUOTE_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_QUOTE_ITEMS,
        });
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut subtotal = 0.0_f64;
    for item in items {
        if item.id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "items.id".to_string(),
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "items.id".to_string(),
                value: item.id.clone(),
            });
        }
        validate_finite("items.qty", item.qty)?;
        validate_finite("items.unit_price", item.unit_price)?;

        let line_total = item.qty * item.unit_price;
        validate_finite("items.total", line_total)?;
        subtotal += line_total;
    }
    validate_finite("subtotal", subtotal)?;

    Ok(())
}

fn validate_quote_fields(
    client_id: &str,
    items: &[LineItem],
    tax_rate: f64,
    discount: f64,
) -> ValidationResult<()> {
    if client_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "client_id".to_string(),
        });
    }
    validate_line_items(items)?;
    validate_tax_rate(tax_rate)?;
    validate_non_negative("discount", discount)?;
    Ok(())
}

/// Validates a draft before an ID is allocated for it.
///
/// Whether the client exists is checked by the store inside the same
/// transaction as the insert.
pub fn validate_draft(draft: &QuoteDraft) -> ValidationResult<()> {
    validate_quote_fields(&draft.client_id, &draft.items, draft.tax_rate, draft.discount)
}

pub fn validate_quote(quote: &Quote) -> ValidationResult<()> {
    validate_quote_fields(&quote.client_id, &quote.items, quote.tax_rate, quote.discount)
}

/// Validates the settings record.
///
/// An empty business name is allowed: a fresh install has none yet.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    if settings.business_name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "business_name".to_string(),
            max: MAX_NAME_LEN,
        });
    }
    validate_email("business_email", settings.business_email.as_deref())?;
    validate_tax_rate(settings.default_tax_rate)?;

    if settings.next_sequence < 1 {
        return Err(ValidationError::OutOfRange {
            field: "next_sequence".to_string(),
            min: 1.0,
            max: i64::MAX as f64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
