//! Result fusion (§4.9 stage 4): weighted sum across the three retrieval
//! paths, merging results that share an id.

use std::collections::BTreeMap;

use ib_core::{RetrievalResult, RetrievalSource};

/// Merges `vector`, `keyword`, and `graph` contributions into one list,
/// summing each path's score by `weight` and recording every source that
/// surfaced a given id.
pub fn fuse(
    vector: Vec<RetrievalResult>,
    keyword: Vec<RetrievalResult>,
    graph: Vec<RetrievalResult>,
    weight_vector: f64,
    weight_keyword: f64,
    weight_graph: f64,
) -> Vec<RetrievalResult> {
    let mut merged: BTreeMap<String, RetrievalResult> = BTreeMap::new();

    for (results, source, weight) in [
        (vector, RetrievalSource::Vector, weight_vector),
        (keyword, RetrievalSource::Keyword, weight_keyword),
        (graph, RetrievalSource::Graph, weight_graph),
    ] {
        for result in results {
            let contribution = result.score * weight;
            merged
                .entry(result.id.clone())
                .and_modify(|existing| {
                    existing.fused_score += contribution;
                    if !existing.sources.contains(&source) {
                        existing.sources.push(source);
                    }
                })
                .or_insert_with(|| RetrievalResult {
                    fused_score: contribution,
                    sources: vec![source],
                    ..result
                });
        }
    }

    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn fusion_matches_seed_scenario_five() {
        // Vectors: a=0.8, b=0.6. Keywords: b=0.5, c=0.4. Graph: c=0.9.
        // Weights 0.5/0.3/0.2 => a=0.40, b=0.45, c=0.30.
        let vector = vec![result("a", RetrievalSource::Vector, 0.8), result("b", RetrievalSource::Vector, 0.6)];
        let keyword = vec![result("b", RetrievalSource::Keyword, 0.5), result("c", RetrievalSource::Keyword, 0.4)];
        let graph = vec![result("c", RetrievalSource::Graph, 0.9)];

        let fused = fuse(vector, keyword, graph, 0.5, 0.3, 0.2);
        let by_id: BTreeMap<_, _> = fused.into_iter().map(|r| (r.id.clone(), r)).collect();

        assert!((by_id["a"].fused_score - 0.40).abs() < 1e-9);
        assert!((by_id["b"].fused_score - 0.45).abs() < 1e-9);
        assert!((by_id["c"].fused_score - 0.30).abs() < 1e-9);
        assert_eq!(by_id["b"].sources.len(), 2);
        assert_eq!(by_id["a"].sources, vec![RetrievalSource::Vector]);
    }

    #[test]
    fn fusion_is_monotone_nondecreasing_in_contributing_weight() {
        let vector = vec![result("a", RetrievalSource::Vector, 0.5)];
        let low = fuse(vector.clone(), vec![], vec![], 0.1, 0.3, 0.2);
        let high = fuse(vector, vec![], vec![], 0.9, 0.3, 0.2);
        assert!(high[0].fused_score >= low[0].fused_score);
    }
}
