//! # API Error Type
//!
//! Unified error type for the command layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Quotebook                              │
//! │                                                                         │
//! │  quotebook quote new ...                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  ── Result<T, ApiError>                        │  │
//! │  │                                                                  │  │
//! │  │  ValidationError / CoreError::Validation ──► VALIDATION_ERROR    │  │
//! │  │  DbError::NotFound / CoreError::*NotFound ──► NOT_FOUND          │  │
//! │  │  DbError::Query/Transaction/..., io::Error ──► PERSISTENCE_ERROR │  │
//! │  │  anything else                            ──► UNKNOWN            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stderr: "error: [NOT_FOUND] Client not found: 1b4e..."   exit code 1   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the same error is printed as
//! `{"code":"NOT_FOUND","message":"..."}` so a UI can switch on `code`.

use serde::Serialize;

use crate::state::ConfigError;
use quotebook_core::{CoreError, ValidationError};
use quotebook_db::DbError;

/// Error returned from every command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record does not exist
    NotFound,

    /// Input broke a business rule; nothing was written
    ValidationError,

    /// The store or a file could not be read or written
    PersistenceError,

    /// Anything that fits none of the above
    Unknown,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::PersistenceError => "PERSISTENCE_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PersistenceError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unknown, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { constraint } => {
                ApiError::validation(format!("A record with this {} already exists", constraint))
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Constraint failed: {}", message);
                ApiError::validation("A value is outside its allowed range")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation(
                    "Invalid reference: the client does not exist or still has quotes",
                )
            }
            DbError::Validation(e) => ApiError::validation(e.to_string()),
            DbError::InvalidData(e) => {
                tracing::error!("Stored data could not be read: {}", e);
                ApiError::persistence(format!("Stored data is corrupt: {}", e))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::persistence("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::persistence("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::persistence("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::persistence("Database transaction failed")
            }
            DbError::PoolExhausted => ApiError::persistence("Database is busy, try again"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::unknown("Internal database error")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ClientNotFound(id) => ApiError::not_found("Client", &id),
            CoreError::QuoteNotFound(id) => ApiError::not_found("Quote", &id),
            CoreError::CatalogItemNotFound(id) => ApiError::not_found("Catalog item", &id),
            e @ CoreError::InvalidQuoteId { .. } => ApiError::validation(e.to_string()),
            e @ CoreError::Envelope(_) => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(e) => ApiError::validation(e.to_string()),
            e @ ConfigError::Parse(_) => ApiError::validation(e.to_string()),
            e @ (ConfigError::Io(_) | ConfigError::Serialize(_) | ConfigError::NoConfigDir) => {
                ApiError::persistence(e.to_string())
            }
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::persistence(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for command functions.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ApiError = DbError::not_found("Quote", "q-20250307-0001").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Quote not found: q-20250307-0001");
    }

    #[test]
    fn test_validation_maps_to_validation_error() {
        let err: ApiError = DbError::Validation(ValidationError::Required {
            field: "name".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_query_failure_hides_details() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::not_found("Client", "abc");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"NOT_FOUND","message":"Client not found: abc"}"#);
    }

    #[test]
    fn test_display_includes_code() {
        let err = ApiError::unknown("boom");
        assert_eq!(err.to_string(), "[UNKNOWN] boom");
    }
}
