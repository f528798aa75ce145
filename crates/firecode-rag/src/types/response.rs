//! Retrieval results and citations

use serde::{Deserialize, Serialize};

use firecode_core::ChunkRecord;

/// Citation for one retrieved passage.
///
/// Carries the full section path and span provenance of the chunk; the
/// retriever never truncates citation metadata independently of the text,
/// so the answer composer can always point a reader back at the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Chunk id
    pub chunk_id: String,
    /// Document id
    pub document_id: String,
    /// Section numbers from document root to the span
    pub section_path: Vec<String>,
    /// Page the span starts on
    pub page: Option<u32>,
    /// Span start byte offset in the document's canonical text
    pub char_start: u64,
    /// One past the span end
    pub char_end: u64,
}

impl Citation {
    /// Build a citation from a stored chunk record
    pub fn from_record(record: &ChunkRecord) -> Self {
        Self {
            chunk_id: record.id.clone(),
            document_id: record.source_ref.document_id.clone(),
            section_path: record.section_path.clone(),
            page: record.source_ref.page,
            char_start: record.source_ref.char_start,
            char_end: record.source_ref.char_end,
        }
    }

    /// Format for inline display, e.g. `[Source: 3.1 > 3.1.2, Page 41]`
    pub fn format_inline(&self) -> String {
        let mut parts = Vec::new();

        if self.section_path.is_empty() {
            parts.push(format!("document {}", self.document_id));
        } else {
            parts.push(self.section_path.join(" > "));
        }

        if let Some(page) = self.page {
            parts.push(format!("Page {page}"));
        }

        format!("[Source: {}]", parts.join(", "))
    }
}

/// One retrieved passage: text, score, and its citation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Chunk id
    pub chunk_id: String,
    /// Passage text
    pub text: String,
    /// Cosine similarity to the query, higher is more relevant
    pub score: f32,
    /// Citation metadata
    pub citation: Citation,
}

impl RetrievedPassage {
    /// Build a passage from a record and its similarity score
    pub fn from_record(record: &ChunkRecord, score: f32) -> Self {
        Self {
            chunk_id: record.id.clone(),
            text: record.text.clone(),
            score,
            citation: Citation::from_record(record),
        }
    }
}

/// Ordered retrieval result.
///
/// Passages are sorted by descending score with ties broken by ascending
/// chunk id. An empty result is a successful outcome meaning no passage
/// cleared the similarity floor; the answer composer must handle it
/// explicitly instead of receiving noise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The query that produced this result
    pub query: String,
    /// Retrieved passages, best first
    pub passages: Vec<RetrievedPassage>,
}

impl RetrievalResult {
    /// Create a result from ordered passages
    pub fn new(query: impl Into<String>, passages: Vec<RetrievedPassage>) -> Self {
        Self {
            query: query.into(),
            passages,
        }
    }

    /// A successful result with no grounding found
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    /// Whether no passage cleared the floor
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Number of retrieved passages
    pub fn len(&self) -> usize {
        self.passages.len()
    }
}
