//! Query requests and candidate filters

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use firecode_core::ChunkRecord;

/// Restricts the candidate set a query is scored against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Keep only chunks whose section path starts with this prefix,
    /// e.g. `["3.1"]` matches sections 3.1, 3.1.2, 3.1.2.1, ...
    #[serde(default)]
    pub section_prefix: Option<Vec<String>>,

    /// Keep only chunks from these documents
    #[serde(default)]
    pub document_ids: Option<Vec<Uuid>>,
}

impl SearchFilter {
    /// Filter by a section path prefix
    pub fn section(prefix: Vec<String>) -> Self {
        Self {
            section_prefix: Some(prefix),
            ..Default::default()
        }
    }

    /// Filter by document ids
    pub fn documents(ids: Vec<Uuid>) -> Self {
        Self {
            document_ids: Some(ids),
            ..Default::default()
        }
    }

    /// Whether a record passes this filter
    pub fn matches(&self, record: &ChunkRecord) -> bool {
        if let Some(prefix) = &self.section_prefix {
            if record.section_path.len() < prefix.len()
                || !record.section_path.starts_with(prefix.as_slice())
            {
                return false;
            }
        }

        if let Some(ids) = &self.document_ids {
            let matches_doc = ids
                .iter()
                .any(|id| id.to_string() == record.source_ref.document_id);
            if !matches_doc {
                return false;
            }
        }

        true
    }
}

/// A retrieval request: query text plus optional per-query overrides.
///
/// Ephemeral — embedded once, searched once, discarded when the call
/// returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to ground
    pub query: String,

    /// Number of passages to retrieve; defaults to the configured top_k
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Minimum similarity override; defaults to the configured floor
    #[serde(default)]
    pub similarity_floor: Option<f32>,

    /// Optional candidate filter
    #[serde(default)]
    pub filter: Option<SearchFilter>,
}

impl QueryRequest {
    /// Create a request with configured defaults
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            similarity_floor: None,
            filter: None,
        }
    }

    /// Override the number of passages to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Override the similarity floor
    pub fn with_floor(mut self, floor: f32) -> Self {
        self.similarity_floor = Some(floor);
        self
    }

    /// Restrict candidates with a filter
    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}
