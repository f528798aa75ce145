//! Index construction and exact top-k search

use std::collections::HashSet;

use rayon::prelude::*;

use crate::error::{IndexError, Result};
use crate::similarity::{dot, normalize};
use crate::types::{ChunkRecord, SearchHit};

/// Accumulates validated chunk records into an immutable [`VectorIndex`].
///
/// The builder is the single writer in the build pipeline: chunking and
/// embedding fan out across documents, but every record passes through one
/// `push` call where dimensionality and vector sanity are enforced. A failed
/// `push` leaves the builder exactly as it was.
pub struct IndexBuilder {
    dimensions: usize,
    records: Vec<ChunkRecord>,
    seen_ids: HashSet<String>,
}

impl IndexBuilder {
    /// Create a builder for vectors of the given dimensionality
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            records: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    /// Validate and admit one record, normalizing its embedding in place
    pub fn push(&mut self, mut record: ChunkRecord) -> Result<()> {
        if record.embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                id: record.id,
                got: record.embedding.len(),
                expected: self.dimensions,
            });
        }

        if let Err(defect) = normalize(&mut record.embedding) {
            return Err(IndexError::InvalidVector {
                id: record.id,
                reason: defect.reason().to_string(),
            });
        }

        if !self.seen_ids.insert(record.id.clone()) {
            return Err(IndexError::DuplicateId(record.id));
        }

        self.records.push(record);
        Ok(())
    }

    /// Number of records admitted so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records have been admitted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seal the builder into a read-only index
    pub fn finish(self) -> VectorIndex {
        tracing::debug!(
            chunks = self.records.len(),
            dimensions = self.dimensions,
            "index built"
        );
        VectorIndex {
            dimensions: self.dimensions,
            records: self.records,
        }
    }
}

/// An immutable chunk index answering exact top-k cosine queries.
///
/// Built offline, queried read-only; `search` takes `&self` and the type has
/// no interior mutability, so an index behind `Arc` serves arbitrary
/// concurrent queries without locking.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    records: Vec<ChunkRecord>,
}

impl VectorIndex {
    pub(crate) fn from_parts(dimensions: usize, records: Vec<ChunkRecord>) -> Self {
        Self {
            dimensions,
            records,
        }
    }

    /// Vector dimensionality this index was built for
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of chunks in the index
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.records.iter()
    }

    /// Top-k records by cosine similarity to `query`.
    ///
    /// Results are ordered by descending score; equal scores break ties by
    /// ascending chunk id so repeated queries are deterministic. Asking for
    /// more results than the index holds returns every record, ordered; an
    /// empty index returns an empty result. `k == 0` is rejected.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<'_>>> {
        self.search_filtered(query, k, |_| true)
    }

    /// Top-k search restricted to records accepted by `predicate`.
    ///
    /// The predicate runs before scoring, so a filtered query is exact over
    /// the surviving candidate set and the caller never needs to oversample.
    pub fn search_filtered<F>(&self, query: &[f32], k: usize, predicate: F) -> Result<Vec<SearchHit<'_>>>
    where
        F: Fn(&ChunkRecord) -> bool + Sync,
    {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        if query.len() != self.dimensions {
            return Err(IndexError::QueryDimensionMismatch {
                got: query.len(),
                expected: self.dimensions,
            });
        }
        if self.records.is_empty() {
            return Ok(Vec::new());
        }

        let mut unit_query = query.to_vec();
        if let Err(defect) = normalize(&mut unit_query) {
            return Err(IndexError::InvalidQuery {
                reason: defect.reason().to_string(),
            });
        }

        let mut hits: Vec<SearchHit<'_>> = self
            .records
            .par_iter()
            .filter(|record| predicate(record))
            .map(|record| SearchHit {
                record,
                score: dot(&unit_query, &record.embedding),
            })
            .collect();

        hits.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        hits.truncate(k);

        Ok(hits)
    }
}
