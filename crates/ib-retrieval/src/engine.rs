//! `ContextualRetrieval` (C9): orchestrates the nine-stage hybrid search
//! pipeline — cache probe, query enhancement, parallel vector/keyword/
//! graph retrieval, fusion, rerank, diversity filtering, truncation, and
//! cache/history bookkeeping.

use std::time::Instant;

use ib_core::{CoreEvent, HostContext, HybridSearchOutcome, MemoryRecord, RetrievalStats};
use tokio::sync::Mutex;

use crate::cache::SemanticCache;
use crate::diversity::filter_diverse;
use crate::enhance::enhance_query;
use crate::fuse::fuse;
use crate::rerank::{rerank, QueryHistory};
use crate::retrieve::{graph_path, keyword_path, vector_path};
use crate::types::{MemoryLayerSource, RetrievalOptions, VectorSearch};

/// Hybrid contextual memory search. Every collaborator (`vector_search`,
/// `memory_sources`) is optional/pluggable so the engine itself never talks
/// to an embedding model or a storage layer directly — it only combines
/// whatever those collaborators hand back.
///
/// Unlike a dynamically-typed host, a single retrieval path failing here
/// can't unwind into "the whole pipeline threw": `vector_path` already
/// turns a collaborator error into an empty contribution (§5, §7), and the
/// keyword/graph paths operate on data already in hand and cannot fail.
/// So the spec's "vector-only fallback, else empty" failure mode collapses
/// to per-path degradation — there's no further pipeline-wide error to
/// catch on top of that.
pub struct ContextualRetrieval {
    options: RetrievalOptions,
    vector_search: Option<Box<dyn VectorSearch>>,
    memory_sources: Vec<Box<dyn MemoryLayerSource>>,
    cache: Mutex<SemanticCache>,
    history: Mutex<QueryHistory>,
}

impl ContextualRetrieval {
    pub fn new(
        options: RetrievalOptions,
        vector_search: Option<Box<dyn VectorSearch>>,
        memory_sources: Vec<Box<dyn MemoryLayerSource>>,
    ) -> Self {
        let cache = SemanticCache::new(options.cache_size, options.cache_similarity_threshold);
        Self { options, vector_search, memory_sources, cache: Mutex::new(cache), history: Mutex::new(QueryHistory::new()) }
    }

    pub async fn initialize(&self, host: &dyn HostContext, now_ms: i64) {
        host.emit(CoreEvent::RetrievalInitialized { timestamp: now_ms });
    }

    async fn all_memories(&self) -> Vec<MemoryRecord> {
        let mut all = Vec::new();
        for source in &self.memory_sources {
            all.extend(source.memories().await);
        }
        all
    }

    /// Runs the full pipeline for `query`. `query_embedding` is supplied by
    /// the caller (embedding computation is out of scope, §1 Non-goals);
    /// passing `None` disables both the vector path and the semantic cache.
    #[tracing::instrument(skip(self, conversation_history, query_embedding), fields(query))]
    pub async fn hybrid_search(
        &self,
        query: &str,
        query_embedding: Option<&[f32]>,
        conversation_history: &[String],
    ) -> HybridSearchOutcome {
        let started = Instant::now();
        let mut stats = RetrievalStats::default();

        if self.options.enable_cache {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.probe(query_embedding) {
                stats.cache_hits += 1;
                return HybridSearchOutcome {
                    results: cached.to_vec(),
                    query: query.to_string(),
                    enhanced_query: query.to_string(),
                    retrieval_time_ms: started.elapsed().as_millis() as u64,
                    method: "cache".to_string(),
                    stats,
                };
            }
            stats.cache_misses += 1;
        }

        let enhanced_query = if self.options.enable_query_enhancement {
            enhance_query(query, conversation_history, self.options.context_window_size)
        } else {
            query.to_string()
        };

        let memories = self.all_memories().await;
        let max_results = self.options.max_results;

        let (vector, keyword, graph) = tokio::join!(
            vector_path(&enhanced_query, query_embedding.filter(|_| self.options.vector_enabled), self.vector_search.as_deref(), max_results),
            async { keyword_path(&enhanced_query, &memories, max_results) },
            async { graph_path(&memories, max_results) },
        );
        stats.vector_count = vector.len();
        stats.keyword_count = keyword.len();
        stats.graph_count = graph.len();

        let fused = fuse(vector, keyword, graph, self.options.weight_vector, self.options.weight_keyword, self.options.weight_graph);
        stats.fused_count = fused.len();

        let ranked = if self.options.enable_rerank {
            let history = self.history.lock().await;
            rerank(fused, &memories, &history, chrono::Utc::now().timestamp_millis())
        } else {
            let mut fused = fused;
            fused.sort_by(|a, b| b.fused_score.partial_cmp(&a.fused_score).unwrap_or(std::cmp::Ordering::Equal));
            fused
        };

        let diverse = filter_diverse(ranked, self.options.diversity_factor);
        stats.after_diversity_count = diverse.len();

        let mut results: Vec<_> = diverse
            .into_iter()
            .filter(|r| r.rerank_score.unwrap_or(r.fused_score) >= self.options.min_relevance_score)
            .collect();
        results.truncate(max_results);

        if self.options.enable_cache {
            let mut cache = self.cache.lock().await;
            cache.store(query_embedding, results.clone());
        }
        self.history.lock().await.record(query);

        HybridSearchOutcome {
            results,
            query: query.to_string(),
            enhanced_query,
            retrieval_time_ms: started.elapsed().as_millis() as u64,
            method: "hybrid".to_string(),
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ib_core::{CoreResult, RetrievalResult};

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

    struct StaticSource(Vec<MemoryRecord>);

    #[async_trait]
    impl MemoryLayerSource for StaticSource {
        fn layer_name(&self) -> &str {
            "short-term"
        }

        async fn memories(&self) -> Vec<MemoryRecord> {
            self.0.clone()
        }
    }

    struct EchoVectorSearch;

    #[async_trait]
    impl VectorSearch for EchoVectorSearch {
        async fn search(&self, _query: &str, _embedding: &[f32], max_results: usize) -> CoreResult<Vec<RetrievalResult>> {
            Ok(vec![RetrievalResult {
                id: "v1".to_string(),
                content: "vector hit about the quick fox".to_string(),
                score: 0.9,
                source: ib_core::RetrievalSource::Vector,
                fused_score: 0.0,
                rerank_score: None,
                metadata: serde_json::Value::Null,
                sources: Vec::new(),
            }][..max_results.min(1)].to_vec())
        }
    }

    #[tokio::test]
    async fn hybrid_search_merges_all_three_paths_without_a_vector_collaborator() {
        let memories = vec![
            memory("m1", "the quick brown fox jumps over the lazy dog", 0.9, 1_000),
            memory("m2", "totally unrelated weather report", 0.2, 2_000),
        ];
        let engine = ContextualRetrieval::new(
            RetrievalOptions::default(),
            None,
            vec![Box::new(StaticSource(memories))],
        );

        let outcome = engine.hybrid_search("quick fox", None, &[]).await;
        assert_eq!(outcome.stats.vector_count, 0);
        assert!(outcome.results.iter().any(|r| r.id == "m1"));
        assert_eq!(outcome.method, "hybrid");
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_the_pipeline_on_the_second_call() {
        let memories = vec![memory("m1", "a memory about rust programming", 0.9, 1_000)];
        let engine = ContextualRetrieval::new(
            RetrievalOptions::default(),
            Some(Box::new(EchoVectorSearch)),
            vec![Box::new(StaticSource(memories))],
        );

        let embedding = vec![1.0, 0.0, 0.0];
        let first = engine.hybrid_search("rust", Some(&embedding), &[]).await;
        assert_eq!(first.method, "hybrid");
        assert_eq!(first.stats.cache_misses, 1);

        let second = engine.hybrid_search("rust", Some(&embedding), &[]).await;
        assert_eq!(second.method, "cache");
        assert_eq!(second.stats.cache_hits, 1);
        assert_eq!(second.results, first.results);
    }

    #[tokio::test]
    async fn query_history_accumulates_across_calls() {
        let engine = ContextualRetrieval::new(RetrievalOptions::default(), None, vec![]);
        engine.hybrid_search("first query", None, &[]).await;
        engine.hybrid_search("second query", None, &[]).await;
        let history = engine.history.lock().await;
        assert_eq!(history.len(), 2);
    }
}
