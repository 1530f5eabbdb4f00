//! Greedy diversity filter (§4.9 stage 6): walks reranked results in order
//! and drops any candidate too similar to something already accepted, so
//! near-duplicate memories don't crowd out distinct ones.

use ib_core::RetrievalResult;

use crate::similarity::jaccard_similarity;

/// Keeps `results` (assumed already sorted best-first) in order, rejecting
/// a candidate whose Jaccard similarity with any already-accepted content
/// exceeds `1.0 - diversity_factor`.
pub fn filter_diverse(results: Vec<RetrievalResult>, diversity_factor: f64) -> Vec<RetrievalResult> {
    let threshold = 1.0 - diversity_factor;
    let mut accepted: Vec<RetrievalResult> = Vec::with_capacity(results.len());

    for candidate in results {
        let too_similar = accepted.iter().any(|kept| jaccard_similarity(&kept.content, &candidate.content) > threshold);
        if !too_similar {
            accepted.push(candidate);
        }
    }

    accepted
}
