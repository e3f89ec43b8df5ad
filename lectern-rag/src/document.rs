//! Data types for documents, chunks, and retrieval results.

use serde::{Deserialize, Serialize};

/// One page (or logical unit) of source text, produced by a document loader.
///
/// Immutable once created; the chunker consumes it during splitting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The raw text content of the page.
    pub text: String,
    /// Display name of the file this page came from.
    pub source_file: String,
    /// 1-based page number, or `None` when unknown.
    pub page_number: Option<u32>,
}

impl Document {
    /// Create a document for a known page of a file.
    pub fn new(text: impl Into<String>, source_file: impl Into<String>, page_number: u32) -> Self {
        Self { text: text.into(), source_file: source_file.into(), page_number: Some(page_number) }
    }
}

/// Provenance attached to every [`Chunk`], stable across persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Display name of the originating file.
    pub source_file: String,
    /// 1-based page number of the originating page, when known.
    pub page_number: Option<u32>,
    /// Sequence-unique id, strictly increasing across one chunking batch.
    pub chunk_id: u64,
}

/// A contiguous slice of a [`Document`]'s text: the unit of embedding,
/// storage, and retrieval. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content; at most `chunk_size` characters.
    pub text: String,
    /// Provenance inherited from the source document.
    pub metadata: ChunkMetadata,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// An ordered retrieval outcome: at most `k` chunks, descending score,
/// ties broken by lowest `chunk_id` first.
pub type RetrievalResult = Vec<ScoredChunk>;
