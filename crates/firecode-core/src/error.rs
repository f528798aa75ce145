//! Error types for the index store

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Index store errors
#[derive(Debug, Error)]
pub enum IndexError {
    /// A record's embedding does not match the index dimensionality
    #[error("dimension mismatch for chunk '{id}': got {got}, index expects {expected}")]
    DimensionMismatch {
        id: String,
        got: usize,
        expected: usize,
    },

    /// A record's embedding cannot be normalized (zero magnitude or non-finite)
    #[error("invalid embedding for chunk '{id}': {reason}")]
    InvalidVector { id: String, reason: String },

    /// Duplicate chunk id inserted into the same index
    #[error("duplicate chunk id '{0}'")]
    DuplicateId(String),

    /// Query vector length does not match the index dimensionality
    #[error("query dimension mismatch: got {got}, index expects {expected}")]
    QueryDimensionMismatch { got: usize, expected: usize },

    /// Query vector cannot be normalized
    #[error("invalid query vector: {reason}")]
    InvalidQuery { reason: String },

    /// k = 0 requested from search
    #[error("search k must be at least 1")]
    InvalidK,

    /// Persisted artifact is unreadable or incompatible
    #[error(transparent)]
    Format(#[from] FormatError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading or validating a persisted index artifact.
///
/// These are deliberately distinct from [`IndexError::Io`]: an unsupported
/// version or a dimensionality mismatch must never be silently treated as a
/// missing or truncated file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// File does not start with the index magic bytes
    #[error("not an index artifact: bad magic")]
    Corrupt,

    /// Artifact was written by an unknown format version
    #[error("unsupported index format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Artifact vectors live in a different space than the running embedder
    #[error("index dimensionality {artifact} does not match embedder dimensionality {expected}")]
    DimensionMismatch { artifact: usize, expected: usize },

    /// Body failed to decode
    #[error("artifact body is corrupt: {0}")]
    Decode(String),
}
