//! The vector index: chunk vectors plus metadata, with build, merge,
//! persist, load, and nearest-neighbor query.
//!
//! Entries are keyed by internal id (their position in the entry list),
//! never by `chunk_id`: merging two independently chunked batches may
//! legitimately collide on `chunk_id`, and both records must survive.
//!
//! Queries are read-only (`&self`) and safe against a stable snapshot;
//! callers that interleave merges with queries hold the index behind a
//! lock (see the pipeline).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Chunk, RetrievalResult, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Number of chunks embedded per provider call during a build.
const EMBED_BATCH_SIZE: usize = 64;

/// Version tag written into every persisted index.
const INDEX_FORMAT_VERSION: u32 = 1;

/// One stored record: an embedding vector and the chunk it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    vector: Vec<f32>,
    chunk: Chunk,
}

/// An exhaustive-scan vector index over embedded chunks.
///
/// Built once from a corpus, optionally persisted and reloaded, and
/// extended in memory by merging a session-local index. Internal ids are
/// stable for the lifetime of an instance.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// The self-describing on-disk form: format version, dimension tag, entries.
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    format_version: u32,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed every chunk and build an index.
    ///
    /// Embedding calls are batched; entry order follows chunk order, so
    /// internal ids align with the input sequence. The build is
    /// all-or-nothing: any provider failure or unexpected vector
    /// dimensionality discards the partial index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the provider errors or returns a
    /// vector whose length differs from `provider.dimensions()`.
    pub async fn build(chunks: &[Chunk], provider: &dyn EmbeddingProvider) -> Result<Self> {
        let dimensions = provider.dimensions();
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let vectors = provider.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(RagError::Embedding {
                    provider: provider.name().to_string(),
                    message: format!(
                        "provider returned {} vectors for {} texts",
                        vectors.len(),
                        batch.len()
                    ),
                });
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                if vector.len() != dimensions {
                    return Err(RagError::Embedding {
                        provider: provider.name().to_string(),
                        message: format!(
                            "expected {dimensions}-dimensional vector, got {} (chunk {})",
                            vector.len(),
                            chunk.metadata.chunk_id
                        ),
                    });
                }
                entries.push(IndexEntry { vector, chunk: chunk.clone() });
            }
        }

        info!(entry_count = entries.len(), dimensions, "built vector index");
        Ok(Self { dimensions, entries })
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The dimensionality of all stored vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Append every entry of `incoming`, keeping both sides' records even
    /// when `chunk_id`s collide.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the two indexes were
    /// built with different embedding dimensionalities.
    pub fn merge(&mut self, incoming: VectorIndex) -> Result<()> {
        if incoming.dimensions != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: incoming.dimensions,
            });
        }
        let added = incoming.entries.len();
        self.entries.extend(incoming.entries);
        info!(added, total = self.entries.len(), "merged vector index");
        Ok(())
    }

    /// Embed `query_text` and return the `k` most similar chunks.
    ///
    /// Results are ordered by descending cosine similarity; ties break by
    /// lowest `chunk_id`, then by insertion order, so identical inputs
    /// always rank identically. Asking for more entries than the index
    /// holds returns everything.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k` is zero and
    /// [`RagError::Embedding`] if the query embedding fails or has the
    /// wrong dimensionality.
    pub async fn query(
        &self,
        query_text: &str,
        k: usize,
        provider: &dyn EmbeddingProvider,
    ) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be greater than zero".into()));
        }

        let query_vector = provider.embed(query_text).await?;
        if query_vector.len() != self.dimensions {
            return Err(RagError::Embedding {
                provider: provider.name().to_string(),
                message: format!(
                    "query embedding has dimension {}, index has {}",
                    query_vector.len(),
                    self.dimensions
                ),
            });
        }

        let mut scored: Vec<(usize, ScoredChunk)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(internal_id, entry)| {
                let score = cosine_similarity(&entry.vector, &query_vector);
                (internal_id, ScoredChunk { chunk: entry.chunk.clone(), score })
            })
            .collect();

        scored.sort_by(|(a_id, a), (b_id, b)| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.metadata.chunk_id.cmp(&b.chunk.metadata.chunk_id))
                .then_with(|| a_id.cmp(b_id))
        });
        scored.truncate(k);

        debug!(k, result_count = scored.len(), "vector index query");
        Ok(scored.into_iter().map(|(_, sc)| sc).collect())
    }

    /// Write the index to `path` as a self-describing JSON blob.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Persist`] on serialization or I/O failure.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let persisted = PersistedIndex {
            format_version: INDEX_FORMAT_VERSION,
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };

        let bytes = serde_json::to_vec(&persisted).map_err(|e| RagError::Persist {
            path: path.to_path_buf(),
            message: format!("serialization failed: {e}"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RagError::Persist {
                path: path.to_path_buf(),
                message: format!("failed to create parent directory: {e}"),
            })?;
        }
        std::fs::write(path, bytes).map_err(|e| RagError::Persist {
            path: path.to_path_buf(),
            message: format!("write failed: {e}"),
        })?;

        info!(path = %path.display(), entry_count = self.entries.len(), "persisted vector index");
        Ok(())
    }

    /// Load an index from `path`, validating it against `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndex`] if the file is unreadable, the
    /// format version is unknown, or the stored dimensionality disagrees
    /// with the provider or with any stored vector.
    pub fn load(path: &Path, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let corrupt = |message: String| RagError::CorruptIndex {
            path: path.to_path_buf(),
            message,
        };

        let bytes =
            std::fs::read(path).map_err(|e| corrupt(format!("read failed: {e}")))?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)
            .map_err(|e| corrupt(format!("unreadable format: {e}")))?;

        if persisted.format_version != INDEX_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unknown format version {}",
                persisted.format_version
            )));
        }
        if persisted.dimensions != provider.dimensions() {
            return Err(corrupt(format!(
                "stored dimensionality {} does not match provider's {}",
                persisted.dimensions,
                provider.dimensions()
            )));
        }
        if let Some(entry) =
            persisted.entries.iter().find(|e| e.vector.len() != persisted.dimensions)
        {
            return Err(corrupt(format!(
                "entry for chunk {} has dimension {}, tag says {}",
                entry.chunk.metadata.chunk_id,
                entry.vector.len(),
                persisted.dimensions
            )));
        }

        info!(
            path = %path.display(),
            entry_count = persisted.entries.len(),
            dimensions = persisted.dimensions,
            "loaded vector index"
        );
        Ok(Self { dimensions: persisted.dimensions, entries: persisted.entries })
    }

    /// All stored vectors paired with their chunks, in internal-id order.
    /// Exposed for round-trip verification in tests.
    pub fn entries(&self) -> impl Iterator<Item = (&[f32], &Chunk)> {
        self.entries.iter().map(|e| (e.vector.as_slice(), &e.chunk))
    }
}

/// Cosine similarity between two equal-length vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
