//! Error types for aquafarm storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// Optimistic version check failed: another writer updated the document
    /// first. The caller must re-fetch and re-derive its command.
    #[error("version conflict: expected={expected}, found={found}")]
    VersionConflict {
        /// The version the writer read before mutating.
        expected: u64,
        /// The version currently stored.
        found: u64,
    },
}
