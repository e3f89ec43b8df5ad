//! Context assembly: serializing retrieved chunks into a single
//! citation-annotated text block.

use serde::{Deserialize, Serialize};

use crate::document::RetrievalResult;

/// Number of preview characters kept per citation.
const PREVIEW_CHARS: usize = 200;

/// A structured pointer from the assembled context back to its source chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// 1-based rank of the source block in the assembled context.
    pub source_id: usize,
    /// Display name of the originating file.
    pub source_file: String,
    /// 1-based page number, when known.
    pub page_number: Option<u32>,
    /// The chunk's sequence id within its chunking batch.
    pub chunk_id: u64,
    /// First ~200 characters of the chunk, newlines collapsed to spaces.
    pub preview: String,
}

/// Retrieved chunks serialized into labeled source blocks, paired with a
/// parallel citation list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssembledContext {
    /// The full context text handed to the answering step.
    pub text: String,
    /// One citation per source block, in block order.
    pub citations: Vec<Citation>,
}

impl AssembledContext {
    /// Whether no chunks were assembled.
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Serialize retrieved chunks into `[SOURCE i]` blocks, preserving rank
/// order, with a blank line between blocks.
///
/// Deterministic and pure: the same results always assemble to the same
/// context and citations.
pub fn assemble(results: &RetrievalResult) -> AssembledContext {
    let mut blocks = Vec::with_capacity(results.len());
    let mut citations = Vec::with_capacity(results.len());

    for (i, scored) in results.iter().enumerate() {
        let rank = i + 1;
        let meta = &scored.chunk.metadata;
        let page = meta
            .page_number
            .map_or_else(|| "?".to_string(), |p| p.to_string());

        blocks.push(format!(
            "[SOURCE {rank}] (file={}, page={page})\n{}",
            meta.source_file, scored.chunk.text
        ));
        citations.push(Citation {
            source_id: rank,
            source_file: meta.source_file.clone(),
            page_number: meta.page_number,
            chunk_id: meta.chunk_id,
            preview: preview(&scored.chunk.text),
        });
    }

    AssembledContext { text: blocks.join("\n\n"), citations }
}

/// First [`PREVIEW_CHARS`] characters with newlines collapsed to spaces.
fn preview(text: &str) -> String {
    text.chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
