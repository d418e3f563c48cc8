//! Storage error types.

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Stored text could not be parsed, or a value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A write would push the backend past its byte quota.
    #[error("quota exceeded: write needs {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        /// Total bytes the backend would hold after the write.
        needed: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// Reading or writing the durable backing file failed.
    #[error("io error: {0}")]
    Io(String),

    /// A storage operation failed internally (e.g. a poisoned lock).
    #[error("storage error: {0}")]
    Internal(String),

    /// No explicit namespace was given and the host exposes no origin hostname.
    #[error("no namespace given and the host context exposes no origin hostname")]
    MissingHostContext,

    /// An origin string is not a URL.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    /// The namespace is unusable as a key prefix.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
