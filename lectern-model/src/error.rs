//! Error types for the `lectern-model` crate.

use thiserror::Error;

/// Errors that can occur when calling an LLM backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend could not be reached or refused the request
    /// (network failure, authentication, rate limiting, 5xx).
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// The backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The backend answered but the response could not be interpreted.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The backend that produced the response.
        provider: String,
        /// What was wrong with it.
        message: String,
    },

    /// A client configuration error (missing key, bad base URL).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
