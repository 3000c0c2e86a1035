//! # Money Module
//!
//! Cent-based view of the currency amounts carried on quotes.
//!
//! ## Where Money Fits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pricing works on f64 amounts that are always round2()'d.               │
//! │                                                                         │
//! │  Quote.total = 64.77 ──► Money::from_amount() ──► 6477 cents (INTEGER)  │
//! │                                                     │                   │
//! │                         Money::amount() ◄───────────┘                   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                        64.77 (bit-identical to what was stored)         │
//! │                                                                         │
//! │  Derived totals are stored as integer cents so the database never      │
//! │  holds binary-drifted values like 64.77000000000001.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quotebook_core::money::Money;
//!
//! let total = Money::from_amount(64.77);
//! assert_eq!(total.cents(), 6477);
//! assert_eq!(total.amount(), 64.77);
//! assert_eq!(total.to_string(), "$64.77");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::pricing::round2;

// =============================================================================
// Money Type
// =============================================================================

/// A currency amount in cents.
///
/// Signed: discounts, credit lines and negative totals are all legitimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a currency amount to cents, applying the pricing rounding rule.
    ///
    /// ## Example
    /// ```rust
    /// use quotebook_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(0.1 + 0.2).cents(), 30);
    /// assert_eq!(Money::from_amount(-40.0).cents(), -4000);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        Money((round2(amount) * 100.0).round() as i64)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a currency amount.
    ///
    /// For any `x` produced by `round2`, `Money::from_amount(x).amount() == x`.
    #[inline]
    pub fn amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Formats with a currency symbol other than `$`.
    ///
    /// ## Example
    /// ```rust
    /// use quotebook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-550).format_with("€"), "-€5.50");
    /// assert_eq!(Money::from_cents(123456).format_with("£"), "£1,234.56");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(abs / 100),
            abs % 100
        )
    }
}

/// `1234567` → `"1,234,567"`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_amount() {
        assert_eq!(Money::from_amount(10.99).cents(), 1099);
        assert_eq!(Money::from_amount(0.0).cents(), 0);
        assert_eq!(Money::from_amount(-5.5).cents(), -550);
        assert_eq!(Money::from_amount(59.969999999999995).cents(), 5997);
    }

    #[test]
    fn test_amount_round_trips_rounded_values() {
        for value in [0.3, 59.97, 64.77, 118.8, -40.0, 1234.56, 0.01] {
            let rounded = round2(value);
            assert_eq!(Money::from_amount(rounded).amount(), rounded);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(100_000_000)), "$1,000,000.00");
    }
}
