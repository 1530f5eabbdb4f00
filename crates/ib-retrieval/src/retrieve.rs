//! The three retrieval paths (§4.9 stage 3). Each is dispatched
//! concurrently by the engine and returns up to `2 * max_results`; an
//! error from any one path degrades to an empty contribution rather than
//! failing the whole search (§5, §7).

use ib_core::{MemoryRecord, RetrievalResult, RetrievalSource};

use crate::types::VectorSearch;

pub async fn vector_path(
    query: &str,
    query_embedding: Option<&[f32]>,
    vector_search: Option<&dyn VectorSearch>,
    max_results: usize,
) -> Vec<RetrievalResult> {
    let (Some(search), Some(embedding)) = (vector_search, query_embedding) else {
        return Vec::new();
    };
    match search.search(query, embedding, 2 * max_results).await {
        Ok(mut results) => {
            for result in &mut results {
                result.source = RetrievalSource::Vector;
            }
            results
        }
        Err(error) => {
            tracing::warn!(%error, "vector retrieval path failed, contributing nothing");
            Vec::new()
        }
    }
}

/// Splits the query into tokens of length > 1, scores each memory by
/// `matches-per-word / 10` (capped at 1.0), and keeps those with at least
/// one match.
pub fn keyword_path(query: &str, memories: &[MemoryRecord], max_results: usize) -> Vec<RetrievalResult> {
    let tokens: Vec<String> = query.to_lowercase().split_whitespace().filter(|w| w.len() > 1).map(str::to_string).collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<RetrievalResult> = memories
        .iter()
        .filter_map(|memory| {
            let content_lower = memory.content.to_lowercase();
            let matches = tokens.iter().filter(|t| content_lower.contains(t.as_str())).count();
            if matches == 0 {
                return None;
            }
            let score = (matches as f64 / 10.0).min(1.0);
            Some(RetrievalResult {
                id: memory.id.clone(),
                content: memory.content.clone(),
                score,
                source: RetrievalSource::Keyword,
                fused_score: 0.0,
                rerank_score: None,
                metadata: memory.metadata.clone(),
                sources: Vec::new(),
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(2 * max_results);
    scored
}

/// Picks the top-N memories across layers by `importance >= 0.6`, sorted
/// by recency, scoring each by its raw importance.
pub fn graph_path(memories: &[MemoryRecord], max_results: usize) -> Vec<RetrievalResult> {
    let mut candidates: Vec<&MemoryRecord> = memories.iter().filter(|m| m.importance >= 0.6).collect();
    candidates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    candidates
        .into_iter()
        .take(2 * max_results)
        .map(|memory| RetrievalResult {
            id: memory.id.clone(),
            content: memory.content.clone(),
            score: memory.importance,
            source: RetrievalSource::Graph,
            fused_score: 0.0,
            rerank_score: None,
            metadata: memory.metadata.clone(),
            sources: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(id: &str, content: &str, importance: f64, timestamp: i64) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            content: content.to_string(),
            timestamp,
            importance,
            tags: Vec::new(),
            category: "general".to_string(),
            layer: "short-term".to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn keyword_path_scores_by_matches_per_word_capped_at_one() {
        let memories = vec![memory("m1", "the quick brown fox jumps", 0.1, 0)];
        let results = keyword_path("quick brown fox elephant", &memories, 10);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn keyword_path_excludes_single_char_tokens() {
        let memories = vec![memory("m1", "a b c", 0.1, 0)];
        let results = keyword_path("a b c", &memories, 10);
        assert!(results.is_empty());
    }

    #[test]
    fn keyword_path_drops_zero_match_memories() {
        let memories = vec![memory("m1", "nothing relevant here", 0.1, 0)];
        let results = keyword_path("unrelated query", &memories, 10);
        assert!(results.is_empty());
    }

    #[test]
    fn graph_path_filters_by_importance_threshold_and_sorts_by_recency() {
        let memories = vec![
            memory("old", "old memory", 0.9, 100),
            memory("low", "low importance", 0.5, 200),
            memory("new", "new memory", 0.7, 300),
        ];
        let results = graph_path(&memories, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "new");
        assert_eq!(results[1].id, "old");
    }

    #[tokio::test]
    async fn vector_path_without_collaborator_contributes_nothing() {
        let results = vector_path("q", Some(&[1.0]), None, 10).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn vector_path_without_embedding_contributes_nothing() {
        struct NeverCalled;
        #[async_trait::async_trait]
        impl VectorSearch for NeverCalled {
            async fn search(&self, _: &str, _: &[f32], _: usize) -> ib_core::CoreResult<Vec<RetrievalResult>> {
                panic!("should not be called without an embedding");
            }
        }
        let results = vector_path("q", None, Some(&NeverCalled), 10).await;
        assert!(results.is_empty());
    }
}
