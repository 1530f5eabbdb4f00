//! Property tests for the similarity primitives and result fusion.
//!
//! Uses proptest to verify:
//! 1. Cosine similarity of two non-zero equal-length embeddings always
//!    lands in `[-1.0, 1.0]`.
//! 2. Jaccard similarity of arbitrary text always lands in `[0.0, 1.0]`.
//! 3. Fusion conserves each path's weighted contribution and never drops
//!    a source from a merged id's `sources` list.

use proptest::prelude::*;

use ib_core::{RetrievalResult, RetrievalSource};

fn arb_embedding(len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-100.0f32..100.0, len)
}

fn result(id: &str, source: RetrievalSource, score: f64) -> RetrievalResult {
    RetrievalResult {
        id: id.to_string(),
        content: format!("content for {id}"),
        score,
        source,
        fused_score: 0.0,
        rerank_score: None,
        metadata: serde_json::Value::Null,
        sources: Vec::new(),
    }
}

proptest! {
    #[test]
    fn cosine_similarity_is_bounded(a in arb_embedding(8), b in arb_embedding(8)) {
        if let Some(sim) = ib_retrieval::similarity::cosine_similarity(&a, &b) {
            prop_assert!((-1.0001..=1.0001).contains(&sim), "cosine similarity {sim} out of bounds");
        }
    }

    #[test]
    fn jaccard_similarity_is_bounded(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
        let sim = ib_retrieval::similarity::jaccard_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn jaccard_similarity_is_reflexive(text in "[a-z]{1,15}") {
        prop_assert!((ib_retrieval::similarity::jaccard_similarity(&text, &text) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fusion_conserves_single_path_weighted_score(score in 0.0f64..1.0, weight in 0.0f64..1.0) {
        let vector = vec![result("a", RetrievalSource::Vector, score)];
        let fused = ib_retrieval::fuse::fuse(vector, vec![], vec![], weight, 0.3, 0.2);
        prop_assert_eq!(fused.len(), 1);
        prop_assert!((fused[0].fused_score - score * weight).abs() < 1e-9);
        prop_assert_eq!(&fused[0].sources, &vec![RetrievalSource::Vector]);
    }
}
