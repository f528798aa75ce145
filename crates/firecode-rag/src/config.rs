//! Configuration for the retrieval pipeline
//!
//! Everything the pipeline tunes lives in explicit structs validated up
//! front; an invalid configuration fails before any document is touched.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Query-time retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Index artifact configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Offline build configuration
    #[serde(default)]
    pub build: BuildConfig,
}

impl RagConfig {
    /// Validate every section; an `Err` here is fatal and pre-work
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        self.embedding.validate()?;
        self.retrieval.validate()?;
        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in bytes of UTF-8 text
    pub chunk_size: usize,
    /// Overlap carried from the tail of one chunk into the next
    pub chunk_overlap: usize,
    /// Floor below which a trailing forced-split fragment is merged back
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    /// Upper bound for a flagged forced-split chunk
    pub fn hard_limit(&self) -> usize {
        self.chunk_size * 2
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.min_chunk_size > self.chunk_size {
            return Err(Error::config(format!(
                "min_chunk_size ({}) must not exceed chunk_size ({})",
                self.min_chunk_size, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            min_chunk_size: 50,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Vector dimensionality the model produces
    pub dimensions: usize,
    /// Service base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Bounded retry attempts for transient failures
    pub max_retries: u32,
    /// Base backoff delay in milliseconds, doubled per attempt
    pub retry_base_delay_ms: u64,
    /// Largest input the service accepts, in bytes
    pub max_input_bytes: usize,
}

impl EmbeddingConfig {
    /// Base backoff delay as a `Duration`
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(Error::config("embedding dimensions must be greater than zero"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("embedding timeout must be greater than zero"));
        }
        if self.max_input_bytes == 0 {
            return Err(Error::config("max_input_bytes must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            max_input_bytes: 8192,
        }
    }
}

/// Query-time retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of passages to retrieve
    pub top_k: usize,
    /// Minimum cosine similarity a passage must reach; below it the
    /// retriever returns an empty result rather than low-confidence noise
    pub similarity_floor: f32,
}

impl RetrievalConfig {
    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::config("top_k must be at least 1"));
        }
        if !(-1.0..=1.0).contains(&self.similarity_floor) {
            return Err(Error::config(format!(
                "similarity_floor ({}) must lie in [-1, 1]",
                self.similarity_floor
            )));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_floor: 0.25,
        }
    }
}

/// Index artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path the build writes the artifact to and queries load it from
    pub artifact_path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("data/corpus.fcix"),
        }
    }
}

/// Offline build configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Documents processed concurrently; defaults to CPU count capped at 8
    pub parallel_documents: Option<usize>,
}

impl BuildConfig {
    /// Effective parallelism for the document fan-out
    pub fn effective_parallelism(&self) -> usize {
        self.parallel_documents
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_fails_fast() {
        let mut config = RagConfig::default();
        config.chunking.chunk_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_dimensions_fails_fast() {
        let mut config = RagConfig::default();
        config.embedding.dimensions = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn similarity_floor_is_range_checked() {
        let mut config = RagConfig::default();
        config.retrieval.similarity_floor = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn hard_limit_doubles_chunk_size() {
        let chunking = ChunkingConfig::default();
        assert_eq!(chunking.hard_limit(), 2 * chunking.chunk_size);
    }
}
