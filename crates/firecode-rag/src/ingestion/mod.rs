//! Offline index construction
//!
//! Documents fan out across a bounded set of workers for chunking and
//! embedding; the only shared write is the mutex-guarded merge into a
//! single [`IndexBuilder`]. A document that fails stays a reported,
//! document-scoped failure — the rest of the batch builds normally.

pub mod chunker;
pub mod parser;

pub use chunker::TextChunker;
pub use parser::{parse_blocks, parse_document, ParseError};

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use uuid::Uuid;

use firecode_core::{IndexBuilder, VectorIndex};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, RetryPolicy};
use crate::types::Document;

/// One document that failed to build, with enough context to re-run it
#[derive(Debug, Clone)]
pub struct DocumentFailure {
    /// Failed document id
    pub document_id: Uuid,
    /// Source file for operator-facing reporting
    pub source_file: String,
    /// What went wrong
    pub error: String,
}

/// Result of an offline build
#[derive(Debug)]
pub struct BuildOutcome {
    /// The built index, containing every successfully processed document
    pub index: VectorIndex,
    /// Documents that failed, reported per document id
    pub failures: Vec<DocumentFailure>,
}

impl BuildOutcome {
    /// Whether every document made it into the index
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build an index from a document batch.
///
/// Configuration problems fail before any work starts. An empty batch is
/// valid and produces an empty index.
pub async fn build_index(
    documents: Vec<Document>,
    config: &RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<BuildOutcome> {
    config.validate()?;
    if embedder.dimensions() != config.embedding.dimensions {
        return Err(Error::config(format!(
            "embedder '{}' produces {} dimensions, configuration expects {}",
            embedder.name(),
            embedder.dimensions(),
            config.embedding.dimensions
        )));
    }

    let parallelism = config.build.effective_parallelism();
    tracing::info!(
        documents = documents.len(),
        parallelism,
        "index build started"
    );

    let semaphore = Arc::new(Semaphore::new(parallelism));
    let builder = Arc::new(Mutex::new(IndexBuilder::new(config.embedding.dimensions)));
    let chunker = TextChunker::new(&config.chunking);
    let retry = RetryPolicy::from_config(&config.embedding);

    let tasks = documents.into_iter().map(|doc| {
        let semaphore = Arc::clone(&semaphore);
        let builder = Arc::clone(&builder);
        let embedder = Arc::clone(&embedder);
        let chunker = &chunker;
        let retry = &retry;

        async move {
            let _permit = semaphore.acquire().await.expect("semaphore is never closed");

            let document_id = doc.id;
            let source_file = doc.source_file.clone();

            match process_document(&doc, chunker, embedder.as_ref(), retry, &builder).await {
                Ok(chunk_count) => {
                    tracing::info!(document = %document_id, chunks = chunk_count, "document indexed");
                    None
                }
                Err(e) => {
                    tracing::error!(document = %document_id, %source_file, error = %e, "document failed");
                    Some(DocumentFailure {
                        document_id,
                        source_file,
                        error: e.to_string(),
                    })
                }
            }
        }
    });

    let failures: Vec<DocumentFailure> = join_all(tasks).await.into_iter().flatten().collect();

    let builder = match Arc::try_unwrap(builder) {
        Ok(mutex) => mutex.into_inner(),
        Err(_) => return Err(Error::config("index builder still shared after build")),
    };
    let index = builder.finish();

    tracing::info!(
        chunks = index.len(),
        failed_documents = failures.len(),
        "index build finished"
    );

    Ok(BuildOutcome { index, failures })
}

/// Build an index and persist it to the configured artifact path
pub async fn build_and_save(
    documents: Vec<Document>,
    config: &RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<BuildOutcome> {
    let outcome = build_index(documents, config, embedder).await?;
    outcome.index.save(&config.index.artifact_path)?;
    Ok(outcome)
}

/// Chunk, embed, and merge one document; errors are scoped to it
async fn process_document(
    doc: &Document,
    chunker: &TextChunker,
    embedder: &dyn EmbeddingProvider,
    retry: &RetryPolicy,
    builder: &Mutex<IndexBuilder>,
) -> Result<usize> {
    let mut chunks = chunker.chunk_document(doc);
    if chunks.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = retry
        .run(|| embedder.embed_batch(&texts))
        .await
        .map_err(|e| Error::ingest(doc.id, format!("embedding failed: {e}")))?;

    if embeddings.len() != chunks.len() {
        return Err(Error::ingest(
            doc.id,
            format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            ),
        ));
    }

    for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
        chunk.attach_embedding(embedding);
    }

    let chunk_count = chunks.len();
    let mut guard = builder.lock();
    for chunk in chunks {
        let record = chunk.into_record()?;
        guard
            .push(record)
            .map_err(|e| Error::ingest(doc.id, e.to_string()))?;
    }

    Ok(chunk_count)
}
