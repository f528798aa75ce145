//! Consumed capabilities: the embedding service boundary

pub mod embedding;
pub mod http;

pub use embedding::{EmbeddingProvider, RetryPolicy};
pub use http::HttpEmbedder;
