//! Tunables, external collaborator traits, and small supporting types for
//! the hybrid retrieval pipeline.

use async_trait::async_trait;

use ib_core::{CoreResult, MemoryRecord, RetrievalResult};

/// Per-call tunables for [`crate::engine::ContextualRetrieval::hybrid_search`].
/// Every default mirrors the value named in spec §4.9.
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    pub max_results: usize,
    pub min_relevance_score: f64,
    pub cache_similarity_threshold: f64,
    pub diversity_factor: f64,
    pub cache_size: usize,
    /// Number of trailing conversation messages folded into the enhanced
    /// query, each truncated to 100 chars.
    pub context_window_size: usize,
    pub weight_vector: f64,
    pub weight_keyword: f64,
    pub weight_graph: f64,
    pub enable_cache: bool,
    pub enable_query_enhancement: bool,
    pub enable_rerank: bool,
    pub vector_enabled: bool,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_relevance_score: 0.0,
            cache_similarity_threshold: 0.95,
            diversity_factor: 0.3,
            cache_size: 100,
            context_window_size: 3,
            weight_vector: 0.5,
            weight_keyword: 0.3,
            weight_graph: 0.2,
            enable_cache: true,
            enable_query_enhancement: true,
            enable_rerank: true,
            vector_enabled: true,
        }
    }
}

/// The vector-retrieval collaborator (§1: embedding/LLM transports are an
/// external concern). Absent or disabled, the vector path contributes
/// nothing — not an error.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(&self, query: &str, query_embedding: &[f32], max_results: usize) -> CoreResult<Vec<RetrievalResult>>;
}

/// A layer of the external deep-memory store (§3: "Memories live in a
/// layered store owned by an external collaborator"). The keyword and
/// graph retrieval paths scan every layer a caller hands in; this crate
/// never writes to one.
#[async_trait]
pub trait MemoryLayerSource: Send + Sync {
    fn layer_name(&self) -> &str;
    async fn memories(&self) -> Vec<MemoryRecord>;
}
