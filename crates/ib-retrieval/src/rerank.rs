//! Reranking (§4.9 stage 5): multiplies the fused score by four factors —
//! source agreement, recency, importance, and overlap with recent query
//! context — and a bounded ring buffer of past queries feeding that last
//! factor.

use std::collections::VecDeque;

use ib_core::{MemoryRecord, RetrievalResult};

use crate::similarity::jaccard_similarity;

const MAX_HISTORY: usize = 10;
const RECENCY_HALF_LIFE_DAYS: f64 = 30.0;

/// Bounded FIFO of recent queries, used to compute the "does this result
/// relate to what we've been asking about" rerank factor.
#[derive(Debug, Clone, Default)]
pub struct QueryHistory {
    queries: VecDeque<String>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self { queries: VecDeque::new() }
    }

    /// Appends `query`, evicting the oldest entry once the buffer holds 10.
    pub fn record(&mut self, query: &str) {
        if self.queries.len() >= MAX_HISTORY {
            self.queries.pop_front();
        }
        self.queries.push_back(query.to_string());
    }

    /// Every recorded query joined by whitespace, used as the "recent
    /// context" side of the overlap factor. Empty when nothing recorded.
    pub fn joined_context(&self) -> String {
        self.queries.iter().cloned().collect::<Vec<_>>().join(" ")
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

fn age_days(now_ms: i64, timestamp_ms: i64) -> f64 {
    ((now_ms - timestamp_ms).max(0) as f64) / 86_400_000.0
}

/// `fusedScore * (1 + 0.2*|sources|) * (0.7 + 0.3*exp(-ageDays/30)) *
/// (0.8 + 0.2*importance) * (0.9 + 0.1*jaccard(recentContext, content))`.
///
/// `memories` is searched by id to recover the timestamp/importance a
/// fused `RetrievalResult` doesn't itself carry (fusion only tracks score
/// and sources); a result with no matching memory falls back to
/// age 0 / importance 0, i.e. the most conservative recency/importance
/// factors.
pub fn rerank(
    mut results: Vec<RetrievalResult>,
    memories: &[MemoryRecord],
    history: &QueryHistory,
    now_ms: i64,
) -> Vec<RetrievalResult> {
    let recent_context = history.joined_context();

    for result in &mut results {
        let memory = memories.iter().find(|m| m.id == result.id);
        let (timestamp, importance) = memory.map(|m| (m.timestamp, m.importance)).unwrap_or((now_ms, 0.0));

        let source_factor = 1.0 + 0.2 * result.sources.len() as f64;
        let recency_factor = 0.7 + 0.3 * (-age_days(now_ms, timestamp) / RECENCY_HALF_LIFE_DAYS).exp();
        let importance_factor = 0.8 + 0.2 * importance;
        let context_factor = if recent_context.is_empty() {
            1.0
        } else {
            0.9 + 0.1 * jaccard_similarity(&recent_context, &result.content)
        };

        let score = result.fused_score * source_factor * recency_factor * importance_factor * context_factor;
        result.rerank_score = Some(score);
    }

    results.sort_by(|a, b| {
        b.rerank_score.unwrap_or(0.0).partial_cmp(&a.rerank_score.unwrap_or(0.0)).unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}
