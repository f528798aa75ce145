//! Error types for the retrieval pipeline

use thiserror::Error;
use uuid::Uuid;

use firecode_core::{FormatError, IndexError};

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Retrieval pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration; fails before any work starts
    #[error("configuration error: {0}")]
    Config(String),

    /// One document failed to ingest; the rest of the batch proceeds
    #[error("document {document_id} failed to ingest: {message}")]
    Ingest { document_id: Uuid, message: String },

    /// Transient embedding service failure; retried with backoff
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Input the embedder can never accept (empty/oversized); not retried
    #[error("invalid embedder input: {0}")]
    InvalidInput(String),

    /// Persisted artifact incompatible with the running configuration
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Query cancelled between embed and search; no partial results
    #[error("retrieval cancelled")]
    Cancelled,

    /// Index store error
    #[error(transparent)]
    Index(IndexError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a document-scoped ingest error
    pub fn ingest(document_id: Uuid, message: impl Into<String>) -> Self {
        Self::Ingest {
            document_id,
            message: message.into(),
        }
    }

    /// Create a transient embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a non-retryable input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether a retry with backoff may succeed.
    ///
    /// Only transient embedding failures qualify; invalid input and every
    /// configuration/format problem will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Embedding(_))
    }
}

impl From<IndexError> for Error {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Format(format) => Error::Format(format),
            other => Error::Index(other),
        }
    }
}
