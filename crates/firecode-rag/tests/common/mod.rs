//! Shared test support: a deterministic embedder

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use firecode_rag::{EmbeddingProvider, Error, Result};

/// Deterministic bag-of-words embedder for tests.
///
/// Each token of at least four characters is hashed into one of `dims`
/// buckets; the vector counts bucket hits. Texts sharing vocabulary score
/// high cosine similarity, unrelated texts score near zero, and the same
/// text always embeds identically.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut first = [0u8; 8];
        first.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(first) % self.dims as u64) as usize
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("text is empty"));
        }

        let lowered = text.to_lowercase();
        let mut vector = vec![0.0f32; self.dims];
        for token in lowered.split(|c: char| !c.is_ascii_alphanumeric()) {
            if token.len() >= 4 {
                vector[self.bucket(token)] += 1.0;
            }
        }

        // Guard against token-free inputs; the index rejects zero vectors.
        if vector.iter().all(|x| *x == 0.0) {
            vector[0] = 1e-3;
        }

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "hash"
    }
}
