//! # Quote ID Formatting
//!
//! Human-readable quote identifiers: `q-YYYYMMDD-NNNN`.
//!
//! ```text
//!   q-20250307-0042
//!   │ │        │
//!   │ │        └── global sequence number, zero-padded to 4 digits
//!   │ │            (widens past 9999: q-20250307-10000)
//!   │ └── local calendar date the quote was created
//!   └── fixed prefix
//! ```
//!
//! The sequence is NOT reset per day. It comes from the persisted
//! `next_sequence` counter in settings, which only quotebook-db touches.
//! This module only formats and parses.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Prefix of every quote ID.
pub const QUOTE_ID_PREFIX: &str = "q-";

/// Minimum width of the sequence part.
pub const SEQUENCE_WIDTH: usize = 4;

/// Formats a quote ID from a calendar date and a sequence number.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use quotebook_core::sequence::format_quote_id;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
/// assert_eq!(format_quote_id(date, 1), "q-20250307-0001");
/// assert_eq!(format_quote_id(date, 12345), "q-20250307-12345");
/// ```
pub fn format_quote_id(date: NaiveDate, sequence: i64) -> String {
    format!(
        "{}{}-{:0width$}",
        QUOTE_ID_PREFIX,
        date.format("%Y%m%d"),
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Calendar date of `at` in the machine's local time zone.
///
/// Quote IDs carry the date the user sees on their wall clock, not UTC.
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// The parts of a parsed quote ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuoteId {
    pub date: NaiveDate,
    pub sequence: i64,
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_quote_id(self.date, self.sequence))
    }
}

impl FromStr for QuoteId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_quote_id(s)
    }
}

/// Parses `q-YYYYMMDD-NNNN` back into its date and sequence.
///
/// ## Errors
/// `CoreError::InvalidQuoteId` when the prefix, date or sequence is wrong.
/// A sequence shorter than four digits is rejected because
/// [`format_quote_id`] never produces one.
pub fn parse_quote_id(id: &str) -> CoreResult<QuoteId> {
    let invalid = |reason: &str| CoreError::InvalidQuoteId {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let rest = id
        .strip_prefix(QUOTE_ID_PREFIX)
        .ok_or_else(|| invalid("must start with 'q-'"))?;

    let (date_part, seq_part) = rest
        .split_once('-')
        .ok_or_else(|| invalid("expected q-YYYYMMDD-NNNN"))?;

    if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("date must be 8 digits (YYYYMMDD)"));
    }
    let field = |range: std::ops::Range<usize>| date_part[range].parse::<u32>().unwrap_or(0);
    let date = NaiveDate::from_ymd_opt(field(0..4) as i32, field(4..6), field(6..8))
        .ok_or_else(|| invalid("date is not a real calendar day"))?;

    if seq_part.len() < SEQUENCE_WIDTH || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("sequence must be at least 4 digits"));
    }
    let sequence = seq_part
        .parse::<i64>()
        .map_err(|_| invalid("sequence is too large"))?;

    Ok(QuoteId { date, sequence })
}

// =============================================================================
// Unit Tests
// =============================================================================
