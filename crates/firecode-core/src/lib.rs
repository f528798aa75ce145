//! firecode-core: exact cosine-similarity chunk index
//!
//! This crate is the storage and search half of the firecode retrieval
//! pipeline. It holds chunk records (text + citation metadata + embedding),
//! answers top-k similarity queries over them, and persists the whole index
//! as a versioned artifact that is rebuilt wholesale when the corpus
//! changes.
//!
//! Vectors are L2-normalized once at insert time, so a raw dot product at
//! query time equals cosine similarity. The index is immutable after
//! `IndexBuilder::finish`; `search` takes `&self` and concurrent queries
//! need no locking.

pub mod error;
pub mod index;
pub mod persist;
pub mod similarity;
pub mod types;

pub use error::{FormatError, IndexError, Result};
pub use index::{IndexBuilder, VectorIndex};
pub use types::{ChunkRecord, SearchHit, SourceRef};

/// On-disk format version written into every artifact header.
pub const FORMAT_VERSION: u32 = 1;
