//! # Basic Pipeline Example
//!
//! Chunks two tiny documents, builds an in-memory index, and asks a
//! question — with a deterministic hash-based embedder and a mock LLM so it
//! runs with **zero API keys**.
//!
//! Run: `cargo run -p lectern-rag --example basic`

use std::sync::Arc;

use async_trait::async_trait;
use lectern_model::MockLlm;
use lectern_rag::{Chunker, Document, EmbeddingProvider, RagConfig, RagPipeline, RecursiveChunker};

// ---------------------------------------------------------------------------
// HashEmbedder — deterministic bag-of-words embeddings for demos
// ---------------------------------------------------------------------------

struct HashEmbedder {
    dimensions: usize,
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> lectern_rag::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut emb = vec![0.0f32; self.dimensions];
                for token in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
                    if token.is_empty() {
                        continue;
                    }
                    let hash = token.bytes().fold(0xcbf29ce484222325u64, |acc, b| {
                        (acc ^ b as u64).wrapping_mul(0x100000001b3)
                    });
                    emb[(hash % self.dimensions as u64) as usize] += 1.0;
                }
                // L2-normalise so cosine similarity is just the dot product.
                let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    emb.iter_mut().for_each(|x| *x /= norm);
                }
                emb
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    // -- 1. Configure the pipeline ----------------------------------------
    let pipeline = RagPipeline::builder()
        .config(RagConfig::builder().chunk_size(50).chunk_overlap(10).top_k(2).build()?)
        .embedding_provider(Arc::new(HashEmbedder { dimensions: 64 }))
        .llm(Arc::new(MockLlm::with_responses([
            "According to [SOURCE 1], Otto and Khatri study governance frameworks.",
        ])))
        .build()?;

    // -- 2. Chunk a tiny corpus and build the index ------------------------
    let documents = vec![
        Document::new("Data governance improves decision quality.", "a.pdf", 1),
        Document::new("Otto and Khatri study governance frameworks.", "b.pdf", 1),
    ];
    let chunks = RecursiveChunker::new(50, 10)?.chunk(&documents)?;
    pipeline.build_index(&chunks).await?;

    // -- 3. Ask a grounded question (retrieval depth from config.top_k) ----
    let answer = pipeline.ask_default("Who studies governance frameworks?").await?;
    println!("{}\n", answer.text);
    for citation in &answer.citations {
        let page = citation.page_number.map_or_else(|| "?".into(), |p: u32| p.to_string());
        println!(
            "[SOURCE {}] {} (page {}) - preview: {}...",
            citation.source_id, citation.source_file, page, citation.preview
        );
    }

    Ok(())
}
