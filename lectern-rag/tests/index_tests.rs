//! Vector index properties: ordering, bounds, round-trips, and merges.

mod common;

use common::{FailingEmbedder, LyingEmbedder, TokenHashEmbedder};
use lectern_rag::{Chunk, ChunkMetadata, RagError, VectorIndex};
use proptest::prelude::*;

const DIM: usize = 16;

fn chunk(text: &str, file: &str, chunk_id: u64) -> Chunk {
    Chunk {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source_file: file.to_string(),
            page_number: Some(1),
            chunk_id,
        },
    }
}

fn corpus() -> Vec<Chunk> {
    vec![
        chunk("data governance improves decision quality", "a.pdf", 0),
        chunk("otto and khatri study governance frameworks", "b.pdf", 1),
        chunk("machine learning models require training data", "c.pdf", 2),
        chunk("frameworks for metadata management", "d.pdf", 3),
    ]
}

/// **Property: query ordering and bounds.**
/// For any set of text chunks and any query, `query` returns at most `k`
/// results, at most as many as the index holds, ordered by non-increasing
/// score.
mod prop_query_ordering {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_k(
            texts in proptest::collection::vec("[a-z]{2,8}( [a-z]{2,8}){0,6}", 1..20),
            query in "[a-z]{2,8}( [a-z]{2,8}){0,4}",
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let provider = TokenHashEmbedder::new(DIM);
                let chunks: Vec<Chunk> = texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| chunk(t, "doc.pdf", i as u64))
                    .collect();
                let index = VectorIndex::build(&chunks, &provider).await.unwrap();
                index.query(&query, k, &provider).await.unwrap()
            });

            prop_assert!(results.len() <= k);
            prop_assert!(results.len() <= texts.len());
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

#[tokio::test]
async fn k_larger_than_index_returns_all_entries() {
    let provider = TokenHashEmbedder::new(DIM);
    let index = VectorIndex::build(&corpus(), &provider).await.unwrap();

    let results = index.query("governance", 100, &provider).await.unwrap();
    assert_eq!(results.len(), corpus().len());
}

#[tokio::test]
async fn zero_k_is_an_invalid_argument() {
    let provider = TokenHashEmbedder::new(DIM);
    let index = VectorIndex::build(&corpus(), &provider).await.unwrap();

    let err = index.query("governance", 0, &provider).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn equal_scores_break_ties_by_lowest_chunk_id() {
    let provider = TokenHashEmbedder::new(DIM);
    // Identical texts embed identically, forcing score ties.
    let chunks = vec![
        chunk("governance", "x.pdf", 5),
        chunk("governance", "x.pdf", 1),
        chunk("governance", "x.pdf", 3),
    ];
    let index = VectorIndex::build(&chunks, &provider).await.unwrap();

    let results = index.query("governance", 3, &provider).await.unwrap();
    let ids: Vec<u64> = results.iter().map(|r| r.chunk.metadata.chunk_id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[tokio::test]
async fn provider_outage_during_build_surfaces_embedding_error() {
    let err = VectorIndex::build(&corpus(), &FailingEmbedder).await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

#[tokio::test]
async fn build_is_all_or_nothing_on_bad_dimensionality() {
    let provider = LyingEmbedder { claimed: DIM, actual: DIM + 1 };
    let err = VectorIndex::build(&corpus(), &provider).await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

#[tokio::test]
async fn persist_load_round_trip_preserves_everything() {
    let provider = TokenHashEmbedder::new(DIM);
    let index = VectorIndex::build(&corpus(), &provider).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    index.persist(&path).unwrap();
    let loaded = VectorIndex::load(&path, &provider).unwrap();

    assert_eq!(loaded.len(), index.len());
    assert_eq!(loaded.dimensions(), index.dimensions());
    for ((vec_a, chunk_a), (vec_b, chunk_b)) in index.entries().zip(loaded.entries()) {
        assert_eq!(chunk_a, chunk_b);
        assert_eq!(vec_a.len(), vec_b.len());
        for (a, b) in vec_a.iter().zip(vec_b.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    // Identical retrieval before and after the round trip.
    let before = index.query("governance frameworks", 3, &provider).await.unwrap();
    let after = loaded.query("governance frameworks", 3, &provider).await.unwrap();
    let ids = |r: &Vec<lectern_rag::ScoredChunk>| -> Vec<u64> {
        r.iter().map(|s| s.chunk.metadata.chunk_id).collect()
    };
    assert_eq!(ids(&before), ids(&after));
}

#[tokio::test]
async fn load_rejects_unreadable_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    std::fs::write(&path, b"definitely not json").unwrap();

    let provider = TokenHashEmbedder::new(DIM);
    let err = VectorIndex::load(&path, &provider).unwrap_err();
    assert!(matches!(err, RagError::CorruptIndex { .. }));
}

#[tokio::test]
async fn load_rejects_provider_dimensionality_mismatch() {
    let provider = TokenHashEmbedder::new(DIM);
    let index = VectorIndex::build(&corpus(), &provider).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");
    index.persist(&path).unwrap();

    let other_provider = TokenHashEmbedder::new(DIM * 2);
    let err = VectorIndex::load(&path, &other_provider).unwrap_err();
    assert!(matches!(err, RagError::CorruptIndex { .. }));
}

#[tokio::test]
async fn merge_rejects_dimensionality_mismatch() {
    let provider_a = TokenHashEmbedder::new(DIM);
    let provider_b = TokenHashEmbedder::new(DIM * 2);
    let mut base = VectorIndex::build(&corpus(), &provider_a).await.unwrap();
    let incoming = VectorIndex::build(&corpus(), &provider_b).await.unwrap();

    let err = base.merge(incoming).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected, actual }
        if expected == DIM && actual == DIM * 2));
}

#[tokio::test]
async fn merge_keeps_both_sides_of_chunk_id_collisions() {
    let provider = TokenHashEmbedder::new(DIM);
    // Both batches start at chunk_id 0, as independent chunking runs do.
    let batch_a = vec![chunk("alpha text", "a.pdf", 0), chunk("beta text", "a.pdf", 1)];
    let batch_b = vec![chunk("gamma text", "b.pdf", 0)];

    let mut base = VectorIndex::build(&batch_a, &provider).await.unwrap();
    let incoming = VectorIndex::build(&batch_b, &provider).await.unwrap();
    base.merge(incoming).unwrap();

    assert_eq!(base.len(), 3);
    let results = base.query("text", 10, &provider).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().any(|r| r.chunk.metadata.source_file == "b.pdf"));
}

#[tokio::test]
async fn merge_is_commutative_in_result_set() {
    let provider = TokenHashEmbedder::new(DIM);
    let batch_a = vec![chunk("governance policy", "a.pdf", 0)];
    let batch_b = vec![chunk("governance frameworks", "b.pdf", 0)];

    let mut ab = VectorIndex::build(&batch_a, &provider).await.unwrap();
    ab.merge(VectorIndex::build(&batch_b, &provider).await.unwrap()).unwrap();
    let mut ba = VectorIndex::build(&batch_b, &provider).await.unwrap();
    ba.merge(VectorIndex::build(&batch_a, &provider).await.unwrap()).unwrap();

    let texts = |index: &VectorIndex| {
        let mut t: Vec<String> = index.entries().map(|(_, c)| c.text.clone()).collect();
        t.sort();
        t
    };
    assert_eq!(texts(&ab), texts(&ba));

    // Both sides' relevant entries are reachable through query.
    let results = ab.query("governance", 2, &provider).await.unwrap();
    let files: Vec<&str> =
        results.iter().map(|r| r.chunk.metadata.source_file.as_str()).collect();
    assert!(files.contains(&"a.pdf") && files.contains(&"b.pdf"));
}

#[tokio::test]
async fn empty_build_produces_an_empty_queryable_index() {
    let provider = TokenHashEmbedder::new(DIM);
    let index = VectorIndex::build(&[], &provider).await.unwrap();
    assert!(index.is_empty());

    let results = index.query("anything", 5, &provider).await.unwrap();
    assert!(results.is_empty());
}
