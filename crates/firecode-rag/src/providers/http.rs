//! HTTP embedding service client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding client for an Ollama-compatible `/api/embeddings` endpoint.
///
/// Classifies failures for the retry layer: network and server-side
/// failures are transient ([`Error::Embedding`]), rejected requests are
/// [`Error::InvalidInput`], and a response with unexpected dimensionality
/// is a configuration error — the service is not running the model this
/// pipeline was configured for.
pub struct HttpEmbedder {
    client: Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    /// Create a client with the configured request timeout
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Check whether the service answers at all
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn validate_input(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("text is empty"));
        }
        if text.len() > self.config.max_input_bytes {
            return Err(Error::invalid_input(format!(
                "text is {} bytes, limit is {}",
                text.len(),
                self.config.max_input_bytes
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.validate_input(text)?;

        let url = format!("{}/api/embeddings", self.config.base_url);
        let request = EmbedRequest {
            model: &self.config.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(Error::invalid_input(format!(
                "embedding service rejected input: HTTP {status}"
            )));
        }
        if !status.is_success() {
            return Err(Error::embedding(format!("embedding service error: HTTP {status}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse embedding response: {e}")))?;

        if parsed.embedding.len() != self.config.dimensions {
            return Err(Error::config(format!(
                "embedding service returned {} dimensions, configured for {}; \
                 check that model '{}' matches the configuration",
                parsed.embedding.len(),
                self.config.dimensions,
                self.config.model
            )));
        }

        Ok(parsed.embedding)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_request() {
        let embedder = HttpEmbedder::new(&EmbeddingConfig::default()).unwrap();
        assert!(matches!(embedder.embed("   ").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn oversized_text_is_rejected_before_any_request() {
        let config = EmbeddingConfig {
            max_input_bytes: 8,
            ..EmbeddingConfig::default()
        };
        let embedder = HttpEmbedder::new(&config).unwrap();
        assert!(matches!(
            embedder.embed("far too long for the limit").await,
            Err(Error::InvalidInput(_))
        ));
    }
}
