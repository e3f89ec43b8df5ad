//! # lectern-rag
//!
//! Retrieval-augmented question answering over PDF corpora, with cited
//! sources.
//!
//! ## Overview
//!
//! The crate ingests PDF articles, splits them into overlapping chunks,
//! embeds them into a [`VectorIndex`], and at query time retrieves the most
//! relevant chunks, assembles a citation-annotated context, and asks an LLM
//! for an answer grounded in that context:
//!
//! - [`RecursiveChunker`] — separator-priority splitting with overlap
//! - [`EmbeddingProvider`] — text-to-vector seam (OpenAI impl behind the
//!   `openai` feature)
//! - [`VectorIndex`] — build, merge, persist, load, nearest-neighbor query
//! - [`assemble`] — deterministic `[SOURCE i]` context blocks + [`Citation`]s
//! - [`GroundedAnswerer`] — the LLM orchestration boundary
//! - [`RagPipeline`] — the caller-facing entry points: ingest, index
//!   management, `ask`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use lectern_model::OpenAIChatClient;
//! use lectern_rag::{RagConfig, RagPipeline, openai::OpenAIEmbeddingProvider};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .llm(Arc::new(OpenAIChatClient::from_env("gpt-4o-mini")?))
//!     .build()?;
//!
//! let chunks = pipeline.ingest(Path::new("data/pdf"))?;
//! pipeline.build_index(&chunks).await?;
//! pipeline.persist_index(Path::new("data/index.json")).await?;
//!
//! let answer = pipeline.ask("What is data governance?", 4).await?;
//! println!("{}", answer.text);
//! for citation in &answer.citations {
//!     println!("[SOURCE {}] {} (page {:?})", citation.source_id, citation.source_file, citation.page_number);
//! }
//! ```
//!
//! Empty-corpus and no-match conditions are normal outcomes, not errors:
//! retrieval over an absent index returns an empty result, and
//! [`RagPipeline::ask`] answers with a fixed no-source message without
//! ever calling the LLM.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;

pub use answer::{DEFAULT_SYSTEM_POLICY, GroundedAnswerer, NO_SOURCE_ANSWER};
pub use chunking::{Chunker, DEFAULT_SEPARATORS, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder, RetryPolicy};
pub use context::{AssembledContext, Citation, assemble};
pub use document::{Chunk, ChunkMetadata, Document, RetrievalResult, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::VectorIndex;
pub use loader::{load_pdf, load_pdf_dir};
pub use pipeline::{Answer, RagPipeline, RagPipelineBuilder};
