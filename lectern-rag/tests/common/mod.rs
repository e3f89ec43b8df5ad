//! Shared test doubles: deterministic embedding providers.
#![allow(dead_code)] // not every test binary uses every double

use async_trait::async_trait;
use lectern_rag::{EmbeddingProvider, RagError, Result};

/// Deterministic bag-of-words embedder: each lowercased alphanumeric token
/// hashes into one of `dimensions` buckets, and the vector is L2-normalized.
/// Texts sharing more tokens get higher cosine similarity, which makes
/// relevance assertions meaningful without a real provider.
pub struct TokenHashEmbedder {
    dimensions: usize,
}

impl TokenHashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            // FNV-1a, fixed constants, stable across runs.
            let hash = token
                .bytes()
                .fold(0xcbf29ce484222325u64, |acc, b| (acc ^ b as u64).wrapping_mul(0x100000001b3));
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for TokenHashEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "token-hash"
    }
}

/// An embedder that always fails, for all-or-nothing build tests.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Err(RagError::Embedding {
            provider: "failing".into(),
            message: "simulated outage".into(),
        })
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// A token-hash embedder that fails whenever a text contains the marker
/// `"!!"`, for rebuild-failure tests against a live pipeline.
pub struct PoisonableEmbedder {
    inner: TokenHashEmbedder,
}

impl PoisonableEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { inner: TokenHashEmbedder::new(dimensions) }
    }
}

#[async_trait]
impl EmbeddingProvider for PoisonableEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains("!!")) {
            return Err(RagError::Embedding {
                provider: "poisonable".into(),
                message: "simulated outage".into(),
            });
        }
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "poisonable"
    }
}

/// An embedder that reports one dimensionality but emits another, for
/// build-time integrity checks.
pub struct LyingEmbedder {
    pub claimed: usize,
    pub actual: usize,
}

#[async_trait]
impl EmbeddingProvider for LyingEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0; self.actual]).collect())
    }

    fn dimensions(&self) -> usize {
        self.claimed
    }

    fn name(&self) -> &str {
        "lying"
    }
}
