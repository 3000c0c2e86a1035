//! # Error Types
//!
//! Domain-specific error types for quotebook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quotebook-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  quotebook-db errors (separate crate)                                  │
//! │  └── DbError          - Record store failures                          │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── ApiError         - What the UI sees (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Client cannot be found.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Quote cannot be found.
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// Catalog item cannot be found.
    ///
    /// ## When This Occurs
    /// - Adding a catalog service to a quote after it was deleted
    /// - Typo in the catalog ID on the command line
    #[error("Catalog item not found: {0}")]
    CatalogItemNotFound(String),

    /// A string does not follow the `q-YYYYMMDD-NNNN` quote ID format.
    #[error("Invalid quote ID '{id}': {reason}")]
    InvalidQuoteId { id: String, reason: String },

    /// Export envelope could not be read or written.
    #[error("Invalid export data: {0}")]
    Envelope(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// They block the operation before anything is written.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Invalid format (e.g., invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two line items with the same id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidQuoteId {
            id: "x-1".to_string(),
            reason: "missing date".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid quote ID 'x-1': missing date");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(err.to_string(), "tax_rate must be between 0 and 1");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
