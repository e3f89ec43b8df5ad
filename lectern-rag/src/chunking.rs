//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], a
//! separator-priority splitter: it prefers the largest semantic boundary
//! (paragraph, line, sentence, word) that keeps a segment within the size
//! limit, and falls back to a hard character cut only when nothing fits.
//! The strategy is greedy and deterministic, not globally optimal.

use tracing::debug;

use crate::document::{Chunk, ChunkMetadata, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations are pure: same documents and parameters, same chunks.
/// Each chunk inherits its document's provenance and receives a `chunk_id`
/// that is strictly increasing across the whole batch, starting at 0.
pub trait Chunker: Send + Sync {
    /// Split a batch of documents into chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if the chunking parameters are
    /// malformed (zero sizes, overlap ≥ size).
    fn chunk(&self, documents: &[Document]) -> Result<Vec<Chunk>>;
}

/// Default separator priority: paragraph break, line break, sentence end,
/// space, then a hard character cut (the empty separator).
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

/// Splits text recursively along a prioritized separator list.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1200, 200)?;
/// let chunks = chunker.chunk(&documents)?;
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a chunker with the default separator priority.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] unless
    /// `0 < chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunk_params(chunk_size, chunk_overlap)?;
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the separator priority list.
    ///
    /// An empty string acts as the hard character cut and should come last;
    /// if absent it is appended so splitting always terminates.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        if !self.separators.iter().any(String::is_empty) {
            self.separators.push(String::new());
        }
        self
    }
}

pub(crate) fn validate_chunk_params(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 || chunk_overlap == 0 {
        return Err(RagError::InvalidArgument(
            "chunk_size and chunk_overlap must be positive".into(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::InvalidArgument(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        validate_chunk_params(self.chunk_size, self.chunk_overlap)?;

        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        let mut chunks = Vec::new();
        let mut next_chunk_id: u64 = 0;

        for document in documents {
            if document.text.is_empty() {
                continue;
            }

            let pieces =
                split_recursive(&document.text, self.chunk_size, self.chunk_overlap, &separators);

            for text in pieces {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                chunks.push(Chunk {
                    text: text.to_string(),
                    metadata: ChunkMetadata {
                        source_file: document.source_file.clone(),
                        page_number: document.page_number,
                        chunk_id: next_chunk_id,
                    },
                });
                next_chunk_id += 1;
            }
        }

        debug!(
            document_count = documents.len(),
            chunk_count = chunks.len(),
            chunk_size = self.chunk_size,
            chunk_overlap = self.chunk_overlap,
            "chunked documents"
        );

        Ok(chunks)
    }
}

/// Character count, not byte count. Size limits are defined in characters so
/// multi-byte text never splits mid-codepoint.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Last `n` characters of `text` as a suffix slice.
fn char_tail(text: &str, n: usize) -> &str {
    let total = char_len(text);
    if total <= n {
        return text;
    }
    match text.char_indices().nth(total - n) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// Split `text` along the highest-priority separator that applies, merging
/// segments greedily up to `chunk_size` characters. Segments that still
/// exceed the limit recurse into the next separator level.
fn split_recursive(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }
    let Some((separator, remaining)) = separators.split_first() else {
        return split_by_size(text, chunk_size, chunk_overlap);
    };
    if separator.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let segments = split_keeping_separator(text, separator);
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, pieces: &mut Vec<String>| {
        if current.is_empty() {
            return;
        }
        if char_len(current) > chunk_size {
            pieces.extend(split_recursive(current, chunk_size, chunk_overlap, remaining));
        } else {
            pieces.push(current.clone());
        }
        current.clear();
    };

    for segment in segments {
        if current.is_empty() {
            current.push_str(segment);
        } else if char_len(&current) + char_len(segment) <= chunk_size {
            current.push_str(segment);
        } else {
            flush(&mut current, &mut pieces);
            // Carry an overlap tail from the previous piece when it still
            // leaves room for the new segment.
            if let Some(prev) = pieces.last() {
                let tail = char_tail(prev, chunk_overlap);
                if char_len(tail) + char_len(segment) <= chunk_size {
                    current.push_str(tail);
                }
            }
            current.push_str(segment);
        }
    }
    flush(&mut current, &mut pieces);

    pieces
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so no characters are lost.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Hard character cut: fixed-size windows with `chunk_overlap` characters
/// shared between consecutive windows. The fallback when no separator fits.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - chunk_overlap;
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    pieces
}
