//! Embedding provider boundary
//!
//! The embedder is a consumed capability: anything that turns text into a
//! fixed-dimension vector can sit behind [`EmbeddingProvider`]. Transient
//! service failures are retried with bounded exponential backoff; input the
//! service can never accept is surfaced immediately.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Trait for generating text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    ///
    /// Implementations return [`Error::Embedding`] for transient
    /// service/network failures (the caller retries those) and
    /// [`Error::InvalidInput`] for empty or oversized text (never retried).
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls `embed` sequentially; implementations
    /// with a batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Vector dimensionality this provider produces
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Bounded retry with exponential backoff for embedder calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts beyond the first
    pub max_retries: u32,
    /// First backoff delay; doubled per subsequent attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Derive the policy from the embedding configuration
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        }
    }

    /// Run `operation`, retrying transient failures with backoff.
    ///
    /// Non-retryable errors (invalid input, configuration, format) are
    /// returned on first occurrence.
    pub async fn run<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => {
                    if attempt < self.max_retries {
                        let delay = self.base_delay * 2u32.pow(attempt);
                        tracing::warn!(
                            attempt = attempt + 1,
                            attempts = self.max_retries + 1,
                            delay_ms = delay.as_millis() as u64,
                            "embedding call failed, retrying"
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::embedding("retry loop exhausted without error")))
    }
}
