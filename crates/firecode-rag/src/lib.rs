//! firecode-rag: retrieval pipeline for building-code question answering
//!
//! Turns fire and life-safety code documents into an offline-built chunk
//! index and answers query-time retrieval requests with ranked, cited
//! passages. Answer generation is a downstream concern: this crate hands
//! the answer composer a plain [`RetrievalResult`] and nothing crosses
//! that boundary except values.
//!
//! Offline: [`ingestion::build_index`] chunks and embeds documents and
//! merges them into a [`firecode_core::VectorIndex`]. Online:
//! [`retrieval::Retriever`] embeds the query, searches the loaded index,
//! applies filters and the similarity floor, and returns passages whose
//! citations carry the full section path and span provenance.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{build_and_save, build_index, parse_document, BuildOutcome, DocumentFailure, TextChunker};
pub use providers::{EmbeddingProvider, HttpEmbedder, RetryPolicy};
pub use retrieval::{CancelToken, Retriever};
pub use types::{
    chunk::Chunk,
    document::{DocBlock, Document},
    query::{QueryRequest, SearchFilter},
    response::{Citation, RetrievalResult, RetrievedPassage},
};

/// Re-export the index store for convenience
pub use firecode_core;
