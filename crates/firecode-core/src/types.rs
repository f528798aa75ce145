//! Chunk records as stored and returned by the index

use serde::{Deserialize, Serialize};

/// Where a chunk came from inside its source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Parent document id
    pub document_id: String,
    /// Character offset of the chunk start in the document text
    pub char_start: u64,
    /// Character offset one past the chunk end
    pub char_end: u64,
    /// Page number the chunk starts on, when the document tracks pages
    pub page: Option<u32>,
}

/// A chunk record: a citable span of source text with its embedding.
///
/// `section_path` is the ordered sequence of section numbers from the
/// document root down to the span (e.g. `["3.1", "3.1.2"]`) and travels with
/// the record so a retrieved passage always carries enough provenance for a
/// verifiable citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Stable chunk id, unique within the index
    pub id: String,
    /// Span text
    pub text: String,
    /// Section numbers, document root first
    pub section_path: Vec<String>,
    /// Document id and span offsets
    pub source_ref: SourceRef,
    /// Embedding vector; normalized in place when inserted into an index
    pub embedding: Vec<f32>,
}

/// One search result: a record reference and its cosine similarity
#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    /// The matched record
    pub record: &'a ChunkRecord,
    /// Cosine similarity in [-1, 1], higher is more similar
    pub score: f32,
}
