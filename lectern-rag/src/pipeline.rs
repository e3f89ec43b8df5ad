//! Pipeline orchestrator.
//!
//! [`RagPipeline`] composes the chunker, embedding provider, vector index,
//! context assembler, and answerer into the three caller-facing entry
//! points: ingest, index management, and `ask`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lectern_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .llm(Arc::new(llm))
//!     .build()?;
//!
//! let chunks = pipeline.ingest(Path::new("data/pdf"))?;
//! pipeline.build_index(&chunks).await?;
//! let answer = pipeline.ask("What is data governance?", 4).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use lectern_model::Llm;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::answer::{GroundedAnswerer, NO_SOURCE_ANSWER};
use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::context::{Citation, assemble};
use crate::document::{Chunk, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::loader::load_pdf_dir;

/// A grounded answer: the model's text plus citations for every source
/// block it was shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text (or the fixed no-source message).
    pub text: String,
    /// Citations in source-block order; empty when nothing was retrieved.
    pub citations: Vec<Citation>,
}

/// The pipeline orchestrator.
///
/// Owns the index handle: a base index (built offline or loaded from disk,
/// read-mostly) that sessions may extend in memory via
/// [`merge_session`](RagPipeline::merge_session). Merges take the write
/// lock, so a concurrent query observes either the pre-merge or the
/// post-merge index, never a partially merged one; concurrent merges
/// serialize on the same lock. Session extensions are never persisted
/// back unless the caller explicitly calls
/// [`persist_index`](RagPipeline::persist_index).
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    answerer: GroundedAnswerer,
    index: RwLock<Option<VectorIndex>>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Load every PDF in a directory and chunk it.
    ///
    /// Returns the chunk batch (its length is the ingested chunk count);
    /// pass it to [`build_index`](RagPipeline::build_index) or
    /// [`merge_session`](RagPipeline::merge_session).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DocumentLoad`] if the directory or a contained
    /// PDF cannot be read.
    pub fn ingest(&self, pdf_dir: &Path) -> Result<Vec<Chunk>> {
        let documents = load_pdf_dir(pdf_dir)?;
        let chunks = self.chunker.chunk(&documents)?;
        info!(
            dir = %pdf_dir.display(),
            page_count = documents.len(),
            chunk_count = chunks.len(),
            "ingested PDF directory"
        );
        Ok(chunks)
    }

    /// Embed `chunks` and install the result as the pipeline's index,
    /// replacing any previously held one.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if embedding fails; the previous
    /// index is kept in that case (builds are all-or-nothing).
    pub async fn build_index(&self, chunks: &[Chunk]) -> Result<()> {
        let built = VectorIndex::build(chunks, self.embedding_provider.as_ref()).await?;
        let mut index = self.index.write().await;
        *index = Some(built);
        Ok(())
    }

    /// Build an ephemeral index from session-supplied chunks and merge it
    /// into the held index. With no index held yet, the ephemeral index
    /// becomes the held one.
    ///
    /// Returns the total entry count after the merge.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if embedding fails and
    /// [`RagError::DimensionMismatch`] if the session index disagrees with
    /// the held one; the held index is unchanged in both cases.
    pub async fn merge_session(&self, chunks: &[Chunk]) -> Result<usize> {
        let session = VectorIndex::build(chunks, self.embedding_provider.as_ref()).await?;
        let mut index = self.index.write().await;
        match index.as_mut() {
            Some(base) => base.merge(session)?,
            None => *index = Some(session),
        }
        let total = index.as_ref().map_or(0, VectorIndex::len);
        info!(chunk_count = chunks.len(), total, "merged session chunks into index");
        Ok(total)
    }

    /// Load a persisted index from `path` and install it.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndex`] if the stored index is unreadable
    /// or disagrees with the configured embedding provider.
    pub async fn load_index(&self, path: &Path) -> Result<()> {
        let loaded = VectorIndex::load(path, self.embedding_provider.as_ref())?;
        let mut index = self.index.write().await;
        *index = Some(loaded);
        Ok(())
    }

    /// Persist the currently held index to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if no index is held and
    /// [`RagError::Persist`] on write failure.
    pub async fn persist_index(&self, path: &Path) -> Result<()> {
        let index = self.index.read().await;
        let index = index
            .as_ref()
            .ok_or_else(|| RagError::InvalidArgument("no index to persist".into()))?;
        index.persist(path)
    }

    /// Retrieve the `k` most relevant chunks for `question`.
    ///
    /// An absent or empty index yields an empty result, signaling "no
    /// corpus available" rather than failing the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `k` is zero and
    /// [`RagError::Embedding`] if the query embedding fails.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be greater than zero".into()));
        }

        let index = self.index.read().await;
        let Some(index) = index.as_ref().filter(|i| !i.is_empty()) else {
            info!("retrieve called with no index, returning empty result");
            return Ok(Vec::new());
        };

        index.query(question, k, self.embedding_provider.as_ref()).await
    }

    /// Answer `question` using the configured `top_k` as the retrieval
    /// depth. Equivalent to [`ask`](RagPipeline::ask) with `config.top_k`.
    pub async fn ask_default(&self, question: &str) -> Result<Answer> {
        self.ask(question, self.config.top_k).await
    }

    /// Answer `question` grounded in the `k` most relevant chunks.
    ///
    /// When retrieval produces nothing, returns the fixed
    /// [`NO_SOURCE_ANSWER`] with empty citations and never calls the LLM,
    /// so no ungrounded answer is ever presented as authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] for `k == 0`,
    /// [`RagError::Embedding`] if the query embedding fails,
    /// [`RagError::InvalidResponse`] if the LLM's reply cannot be
    /// interpreted, and [`RagError::ProviderUnavailable`] if the LLM stays
    /// unreachable after retries.
    pub async fn ask(&self, question: &str, k: usize) -> Result<Answer> {
        let results = self.retrieve(question, k).await?;

        if results.is_empty() {
            info!(question, "no relevant sources, answering without LLM call");
            return Ok(Answer { text: NO_SOURCE_ANSWER.to_string(), citations: Vec::new() });
        }

        let context = assemble(&results);
        let text = self.answerer.answer(question, &context).await?;
        info!(
            question,
            source_count = context.citations.len(),
            "answered with grounded sources"
        );
        Ok(Answer { text, citations: context.citations })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider`, and `llm` are required; the chunker
/// defaults to a [`RecursiveChunker`] driven by the config's chunking
/// parameters.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    llm: Option<Arc<dyn Llm>>,
    chunker: Option<Arc<dyn Chunker>>,
    system_policy: Option<String>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the LLM used for answering.
    pub fn llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set a custom chunking strategy.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the grounding policy sent to the LLM as the system message.
    pub fn system_policy(mut self, policy: impl Into<String>) -> Self {
        self.system_policy = Some(policy.into());
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are
    /// set and the configuration is consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or the
    /// default chunker cannot be constructed from the configuration.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let llm = self.llm.ok_or_else(|| RagError::Config("llm is required".to_string()))?;

        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(
                RecursiveChunker::new(config.chunk_size, config.chunk_overlap)
                    .map_err(|e| RagError::Config(e.to_string()))?,
            ),
        };

        let mut answerer = GroundedAnswerer::new(llm, config.retry.clone());
        if let Some(policy) = self.system_policy {
            answerer = answerer.with_system_policy(policy);
        }

        Ok(RagPipeline {
            config,
            embedding_provider,
            chunker,
            answerer,
            index: RwLock::new(None),
        })
    }
}
