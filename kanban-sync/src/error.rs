//! Error types for the sync engine

use thiserror::Error;

/// Result type for board store operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type for record service calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Errors reported by a record service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// The service refused the write (constraint violation, bad payload, ...)
    #[error("{message}")]
    Rejected { message: String },

    /// The addressed record does not exist
    #[error("{table} record not found: {id}")]
    NotFound { table: String, id: String },

    /// The service could not be reached or timed out
    #[error("record service unavailable: {message}")]
    Unavailable { message: String },
}

impl ServiceError {
    /// Create a rejected-write error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Errors that can occur in board store operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Column title was empty or whitespace
    #[error("Column title cannot be empty.")]
    EmptyTitle,

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Bulk insert called with no records
    #[error("No cards to insert.")]
    NothingToImport,

    /// Column not present in the current snapshot
    #[error("column not found: {id}")]
    ColumnNotFound { id: String },

    /// Card not present in the current snapshot
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// No position is left after the highest stored one
    #[error("no position available after {after}")]
    PositionOverflow { after: i64 },

    /// A single write was rejected by the record service
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// Some writes of a multi-write operation failed
    #[error("{op}: {failed} of {total} writes failed: {}", .messages.join("; "))]
    PartialBatch {
        op: String,
        failed: usize,
        total: usize,
        messages: Vec<String>,
    },

    /// Reconciliation fetch failed
    #[error("fetch failed: {0}")]
    Fetch(ServiceError),

    /// The store was disposed
    #[error("board store has been disposed")]
    Disposed,

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl SyncError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a partial batch error from the failed writes of `total`
    pub fn partial_batch(op: impl Into<String>, total: usize, messages: Vec<String>) -> Self {
        Self::PartialBatch {
            op: op.into(),
            failed: messages.len(),
            total,
            messages,
        }
    }

    /// True for errors caught locally before any write was issued
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle
                | Self::MissingField { .. }
                | Self::NothingToImport
                | Self::ColumnNotFound { .. }
                | Self::CardNotFound { .. }
                | Self::PositionOverflow { .. }
        )
    }

    /// Check if retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Service(ServiceError::Unavailable { .. })
                | Self::Fetch(ServiceError::Unavailable { .. })
                | Self::PartialBatch { .. }
        )
    }
}

impl From<figment::Error> for SyncError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}
