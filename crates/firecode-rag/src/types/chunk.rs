//! Chunks: bounded, citable spans of a document's canonical text

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use firecode_core::{ChunkRecord, SourceRef};

use crate::error::{Error, Result};

/// A chunk produced by the chunker, embedded later in the build.
///
/// `char_start`/`char_end` are byte offsets into the document's canonical
/// text. The id is a deterministic hash of document id and span offsets, so
/// rebuilding an unchanged corpus reproduces identical ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable chunk id
    pub id: String,
    /// Parent document id
    pub document_id: Uuid,
    /// Span text
    pub text: String,
    /// Section numbers from document root to this span
    pub section_path: Vec<String>,
    /// Span start in the canonical text
    pub char_start: usize,
    /// One past the span end
    pub char_end: usize,
    /// Page the span starts on
    pub page: Option<u32>,
    /// Position of this chunk within its document
    pub chunk_index: u32,
    /// Set when the span had to be cut mid-paragraph at the size limit
    pub forced_split: bool,
    /// Embedding vector; set exactly once at build time
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create a chunk; the id is derived from `document_id` and the span
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document_id: Uuid,
        text: String,
        section_path: Vec<String>,
        char_start: usize,
        char_end: usize,
        page: Option<u32>,
        chunk_index: u32,
        forced_split: bool,
    ) -> Self {
        Self {
            id: Self::deterministic_id(&document_id, char_start, char_end),
            document_id,
            text,
            section_path,
            char_start,
            char_end,
            page,
            chunk_index,
            forced_split,
            embedding: None,
        }
    }

    /// Stable id: SHA-256 over document id and span offsets, hex-truncated
    pub fn deterministic_id(document_id: &Uuid, char_start: usize, char_end: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(document_id.as_bytes());
        hasher.update((char_start as u64).to_le_bytes());
        hasher.update((char_end as u64).to_le_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }

    /// Attach the embedding computed for this chunk's text
    pub fn attach_embedding(&mut self, embedding: Vec<f32>) {
        debug_assert!(self.embedding.is_none(), "embedding is set once at build time");
        self.embedding = Some(embedding);
    }

    /// Convert into the record form the index stores
    pub fn into_record(self) -> Result<ChunkRecord> {
        let embedding = self.embedding.ok_or_else(|| {
            Error::ingest(self.document_id, format!("chunk '{}' has no embedding", self.id))
        })?;

        Ok(ChunkRecord {
            id: self.id,
            text: self.text,
            section_path: self.section_path,
            source_ref: SourceRef {
                document_id: self.document_id.to_string(),
                char_start: self.char_start as u64,
                char_end: self.char_end as u64,
                page: self.page,
            },
            embedding,
        })
    }
}
