//! Configuration for the retrieval pipeline.
//!
//! Configuration is an explicit struct passed into pipeline construction,
//! never ambient process state; provider constructors offer `from_env`
//! conveniences, but the core reads no environment variables itself.

use serde::{Deserialize, Serialize};

use crate::chunking::validate_chunk_params;
use crate::error::{RagError, Result};

/// Retry behavior for transient LLM-provider failures.
///
/// Delays grow exponentially: `initial_delay_ms * 2^attempt`, capped at
/// `max_delay_ms`. Only the orchestration boundary retries; core index
/// operations never do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (1 = no retries).
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 500, max_delay_ms: 8_000 }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based), in milliseconds.
    pub(crate) fn delay_ms(&self, attempt: u32) -> u64 {
        let exp = 2u64.saturating_pow(attempt);
        self.initial_delay_ms.saturating_mul(exp).min(self.max_delay_ms)
    }
}

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Retrieval depth used by `ask_default`; `ask` and `retrieve` take an
    /// explicit `k` instead.
    pub top_k: usize,
    /// Retry behavior for LLM calls.
    pub retry: RetryPolicy,
}

impl Default for RagConfig {
    fn default() -> Self {
        // 1200/200 matches the corpus the original ingest tooling targeted:
        // article-length PDFs with ~15% overlap.
        Self { chunk_size: 1200, chunk_overlap: 200, top_k: 4, retry: RetryPolicy::default() }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of retrieved results.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the retry policy for LLM calls.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_overlap >= chunk_size`,
    /// either chunking parameter is zero, or `top_k` is zero.
    pub fn build(self) -> Result<RagConfig> {
        validate_chunk_params(self.config.chunk_size, self.config.chunk_overlap)
            .map_err(|e| RagError::Config(e.to_string()))?;
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".into()));
        }
        if self.config.retry.max_attempts == 0 {
            return Err(RagError::Config("retry.max_attempts must be at least 1".into()));
        }
        Ok(self.config)
    }
}
