//! Embedding provider trait for converting text to vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that converts text into fixed-dimension vectors.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Index builds are batch-first, so
/// [`embed_batch`](EmbeddingProvider::embed_batch) is the required method;
/// [`embed`](EmbeddingProvider::embed) defaults to a one-element batch.
///
/// Providers must be deterministic for a given text and configuration, so
/// that index rebuilds are reproducible.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::EmbeddingProvider;
///
/// let vectors = provider.embed_batch(&["first", "second"]).await?;
/// assert!(vectors.iter().all(|v| v.len() == provider.dimensions()));
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding vectors for a batch of texts, in input order.
    ///
    /// Every returned vector must have [`dimensions`](EmbeddingProvider::dimensions)
    /// elements.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding vector for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        Ok(vectors.pop().unwrap_or_default())
    }

    /// The fixed dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;

    /// A human-readable provider name (used in logs and errors).
    fn name(&self) -> &str {
        "embedding"
    }
}
