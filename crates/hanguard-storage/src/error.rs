use thiserror::Error;

/// Storage-specific error types for the rights store.
///
/// Repository callers treat every one of these as a deny; they exist so the
/// logs can say why a lookup failed, not to change the outcome.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored record does not satisfy the domain invariants
    /// (e.g. a door id outside the 4-bit wire range)
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
