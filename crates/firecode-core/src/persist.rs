//! Versioned on-disk index artifact
//!
//! Layout: 4 magic bytes (`FCIX`), a little-endian `u32` format version,
//! then a bincode body holding dimensionality, chunk count, and the full
//! record list. The header is read and validated before the body is
//! decoded, so an artifact written by a future format version fails with
//! [`FormatError::UnsupportedVersion`] instead of a misleading decode
//! error.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, IndexError, Result};
use crate::index::VectorIndex;
use crate::types::ChunkRecord;
use crate::FORMAT_VERSION;

const MAGIC: &[u8; 4] = b"FCIX";
const HEADER_LEN: usize = 8;

#[derive(Serialize, Deserialize)]
struct ArtifactBody {
    dimensions: u32,
    chunk_count: u64,
    records: Vec<ChunkRecord>,
}

impl VectorIndex {
    /// Write the index to `path` as a versioned artifact.
    ///
    /// The artifact is written to a sibling temp file and renamed into
    /// place, so a failure mid-write never clobbers an existing index.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let body = ArtifactBody {
            dimensions: self.dimensions() as u32,
            chunk_count: self.len() as u64,
            records: self.records().cloned().collect(),
        };
        let encoded = bincode::serde::encode_to_vec(&body, bincode::config::standard())
            .map_err(|e| IndexError::Format(FormatError::Decode(e.to_string())))?;

        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(MAGIC)?;
            file.write_all(&FORMAT_VERSION.to_le_bytes())?;
            file.write_all(&encoded)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        tracing::info!(path = %path.display(), chunks = self.len(), "index saved");
        Ok(())
    }

    /// Read an artifact from `path`, validating magic and format version.
    ///
    /// Load is read-only and never mutates the file. Dimensionality against
    /// the running embedder is checked by the retriever; this only verifies
    /// the artifact is internally consistent.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;

        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(FormatError::Corrupt.into());
        }

        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(&bytes[4..8]);
        let version = u32::from_le_bytes(version_bytes);
        if version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion {
                found: version,
                supported: FORMAT_VERSION,
            }
            .into());
        }

        let (body, _): (ArtifactBody, usize) =
            bincode::serde::decode_from_slice(&bytes[HEADER_LEN..], bincode::config::standard())
                .map_err(|e| IndexError::Format(FormatError::Decode(e.to_string())))?;

        if body.records.len() as u64 != body.chunk_count {
            return Err(FormatError::Decode(format!(
                "chunk_count {} does not match {} records",
                body.chunk_count,
                body.records.len()
            ))
            .into());
        }

        let dimensions = body.dimensions as usize;
        for record in &body.records {
            if record.embedding.len() != dimensions {
                return Err(FormatError::Decode(format!(
                    "record '{}' has {} dimensions, artifact declares {}",
                    record.id,
                    record.embedding.len(),
                    dimensions
                ))
                .into());
            }
        }

        tracing::info!(path = %path.display(), chunks = body.records.len(), "index loaded");
        Ok(VectorIndex::from_parts(dimensions, body.records))
    }
}
