//! # Record Store Errors
//!
//! Everything a repository can fail with. SQLite constraint failures are
//! classified by sqlx's [`ErrorKind`](sqlx::error::ErrorKind) so callers can
//! tell "your input conflicts with what is stored" apart from "the store is
//! broken". The app maps the first group to `VALIDATION_ERROR` and the
//! second to `PERSISTENCE_ERROR`.

use quotebook_core::ValidationError;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A primary key or unique index already holds this value, e.g. an
    /// imported quote whose ID is listed twice.
    #[error("Already exists: {constraint}")]
    UniqueViolation { constraint: String },

    /// A quote names a client that is not there, or a client with quotes
    /// was deleted.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A `CHECK` or `NOT NULL` column rule rejected the row.
    #[error("Constraint failed: {message}")]
    CheckViolation { message: String },

    /// A record failed a business rule on its way in.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A stored row could not be turned back into a domain value.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Timed out waiting for a database connection")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    // "UNIQUE constraint failed: quotes.id"
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        constraint: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or(message.as_str())
                            .to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::CheckViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::InvalidData(err.to_string())
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
