//! Error types for the `lectern-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in retrieval and grounding operations.
///
/// Empty-corpus and no-match conditions are *not* errors: retrieval over an
/// absent index yields an empty result, and `ask` answers with a fixed
/// no-source message. The variants here split into caller bugs
/// ([`InvalidArgument`](RagError::InvalidArgument), [`Config`](RagError::Config)),
/// transient provider failures ([`Embedding`](RagError::Embedding),
/// [`ProviderUnavailable`](RagError::ProviderUnavailable)), and data
/// integrity failures that are never retried
/// ([`InvalidResponse`](RagError::InvalidResponse),
/// [`DimensionMismatch`](RagError::DimensionMismatch),
/// [`CorruptIndex`](RagError::CorruptIndex)).
#[derive(Debug, Error)]
pub enum RagError {
    /// A caller supplied an out-of-contract value (overlap ≥ size, k = 0).
    /// Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The embedding provider failed or returned malformed vectors.
    /// Transient; safe to retry at the orchestration boundary.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The LLM backend could not be reached, after retries were exhausted.
    #[error("Provider unavailable ({provider}): {message}")]
    ProviderUnavailable {
        /// The LLM backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The LLM backend answered, but the response could not be
    /// interpreted. A malformed 200 is not an outage; never retried.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The LLM backend that produced the response.
        provider: String,
        /// What was wrong with it.
        message: String,
    },

    /// Two vector sets with different dimensionalities were combined.
    /// Fatal for the affected index; never coerced.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality of the receiving index.
        expected: usize,
        /// The dimensionality that was offered.
        actual: usize,
    },

    /// A built index could not be written to durable storage.
    #[error("Failed to persist index to {}: {message}", path.display())]
    Persist {
        /// The target location.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A persisted index could not be read, or disagrees with the
    /// configured embedding provider.
    #[error("Corrupt index at {}: {message}", path.display())]
    CorruptIndex {
        /// Location of the unreadable index.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The answerer was invoked with zero retrieved chunks.
    #[error("Cannot answer with empty context")]
    EmptyContext,

    /// A source document could not be loaded.
    #[error("Failed to load {}: {message}", path.display())]
    DocumentLoad {
        /// The file that failed to load.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<lectern_model::ModelError> for RagError {
    fn from(err: lectern_model::ModelError) -> Self {
        match err {
            lectern_model::ModelError::Provider { provider, message } => {
                RagError::ProviderUnavailable { provider, message }
            }
            lectern_model::ModelError::InvalidResponse { provider, message } => {
                RagError::InvalidResponse { provider, message }
            }
            lectern_model::ModelError::Config(message) => RagError::Config(message),
        }
    }
}


/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
