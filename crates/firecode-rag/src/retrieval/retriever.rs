//! The retriever: query text in, ranked cited passages out

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use firecode_core::{FormatError, VectorIndex};

use crate::config::{RagConfig, RetrievalConfig};
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, RetryPolicy};
use crate::types::query::QueryRequest;
use crate::types::response::{RetrievalResult, RetrievedPassage};

/// Cooperative cancellation handle for an in-flight query.
///
/// Checked between the embed and search steps: a cancelled query yields
/// [`Error::Cancelled`], never a truncated result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a live token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Maps a query to ranked, attributed passages from an immutable index.
///
/// Holds the index behind `Arc` and never mutates it; any number of
/// retrievals may run concurrently against the same index.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: RetrievalConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("index", &self.index)
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Retriever {
    /// Create a retriever, verifying the index and embedder agree on
    /// dimensionality.
    ///
    /// A mismatch is a hard [`FormatError::DimensionMismatch`]: comparing
    /// vectors from two different embedding spaces would silently return
    /// garbage rankings.
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RagConfig,
    ) -> Result<Self> {
        if index.dimensions() != embedder.dimensions() {
            return Err(FormatError::DimensionMismatch {
                artifact: index.dimensions(),
                expected: embedder.dimensions(),
            }
            .into());
        }

        Ok(Self {
            index,
            embedder,
            config: config.retrieval.clone(),
            retry: RetryPolicy::from_config(&config.embedding),
        })
    }

    /// Retrieve passages for a query
    pub async fn retrieve(&self, request: &QueryRequest) -> Result<RetrievalResult> {
        self.retrieve_cancellable(request, &CancelToken::new()).await
    }

    /// Retrieve passages, honoring a cancellation token.
    ///
    /// Passages below the similarity floor are dropped; when nothing
    /// clears it, the result is empty and successful — "no grounding
    /// found" is an answer, not an error.
    pub async fn retrieve_cancellable(
        &self,
        request: &QueryRequest,
        cancel: &CancelToken,
    ) -> Result<RetrievalResult> {
        let k = request.top_k.unwrap_or(self.config.top_k);
        let floor = request.similarity_floor.unwrap_or(self.config.similarity_floor);

        let query_vector = self
            .retry
            .run(|| self.embedder.embed(&request.query))
            .await?;

        if query_vector.len() != self.index.dimensions() {
            return Err(FormatError::DimensionMismatch {
                artifact: self.index.dimensions(),
                expected: query_vector.len(),
            }
            .into());
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let hits = match &request.filter {
            Some(filter) => self
                .index
                .search_filtered(&query_vector, k, |record| filter.matches(record))?,
            None => self.index.search(&query_vector, k)?,
        };

        let passages: Vec<RetrievedPassage> = hits
            .into_iter()
            .filter(|hit| hit.score >= floor)
            .map(|hit| RetrievedPassage::from_record(hit.record, hit.score))
            .collect();

        tracing::debug!(
            query = %request.query,
            k,
            floor,
            passages = passages.len(),
            "retrieval complete"
        );

        Ok(RetrievalResult::new(request.query.clone(), passages))
    }
}
