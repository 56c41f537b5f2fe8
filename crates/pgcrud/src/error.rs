//! Error types for pgcrud

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pgcrud operations
pub type CrudResult<T> = Result<T, CrudError>;

/// Error types for CRUD operations.
///
/// Every variant that comes out of a database round trip carries the operation
/// that was being attempted, so callers can tell a failed count apart from a
/// failed scan without parsing messages.
#[derive(Debug, Error)]
pub enum CrudError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// A find-one style query matched zero rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected or failed the statement
    #[error("failed to {context}: {source}")]
    Query {
        context: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Begin/commit failure around a multi-statement unit
    #[error("failed to {context}: {source}")]
    Transaction {
        context: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Unique constraint violation
    #[error("failed to {context}: unique constraint violation: {message}")]
    UniqueViolation {
        context: &'static str,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("failed to {context}: foreign key violation: {message}")]
    ForeignKeyViolation {
        context: &'static str,
        message: String,
    },

    /// Check constraint violation
    #[error("failed to {context}: check constraint violation: {message}")]
    CheckViolation {
        context: &'static str,
        message: String,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The backend did not report a generated identity for an insert
    #[error("insert did not return a generated identity")]
    MissingIdentity,

    /// Invalid input caught before reaching the database
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),
}

impl CrudError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// Check if this is a foreign key violation error
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }

    /// Check if this is a check constraint violation error
    pub fn is_check_violation(&self) -> bool {
        matches!(self, Self::CheckViolation { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error came from a mapping/decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Classify a `tokio_postgres` error raised while performing `context`.
    ///
    /// Constraint violations get their own variants; everything else becomes
    /// [`CrudError::Query`].
    pub fn from_db_error(context: &'static str, err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = format!("{constraint}: {}", db_err.message());

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation { context, message },
                "23503" => return Self::ForeignKeyViolation { context, message },
                "23514" => return Self::CheckViolation { context, message },
                _ => {}
            }
        }
        Self::Query {
            context,
            source: err,
        }
    }

    /// Wrap a begin/commit failure.
    pub fn transaction(context: &'static str, err: tokio_postgres::Error) -> Self {
        Self::Transaction {
            context,
            source: err,
        }
    }

    /// Replace the operation context of a query or constraint error.
    ///
    /// Client implementations only know they ran "a statement"; the CRUD layer
    /// re-labels the error with what it was actually doing.
    pub(crate) fn with_context(self, context: &'static str) -> Self {
        match self {
            Self::Query { source, .. } => Self::Query { context, source },
            Self::UniqueViolation { message, .. } => Self::UniqueViolation { context, message },
            Self::ForeignKeyViolation { message, .. } => {
                Self::ForeignKeyViolation { context, message }
            }
            Self::CheckViolation { message, .. } => Self::CheckViolation { context, message },
            other => other,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for CrudError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
