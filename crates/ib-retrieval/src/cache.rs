//! Semantic cache (§4.9 stages 1 and 8): a FIFO-bounded cache keyed by
//! embedding similarity rather than exact query text, so paraphrases of a
//! recent query can still hit.

use std::collections::VecDeque;

use ib_core::RetrievalResult;

use crate::similarity::cosine_similarity;

struct CacheEntry {
    embedding: Vec<f32>,
    results: Vec<RetrievalResult>,
}

/// Bounded FIFO semantic cache. `capacity` mirrors `RetrievalOptions::cache_size`.
pub struct SemanticCache {
    capacity: usize,
    similarity_threshold: f64,
    entries: VecDeque<CacheEntry>,
}

impl SemanticCache {
    pub fn new(capacity: usize, similarity_threshold: f64) -> Self {
        Self { capacity, similarity_threshold, entries: VecDeque::new() }
    }

    /// Returns the cached results for the entry most similar to
    /// `query_embedding`, if any entry clears `similarity_threshold`. A
    /// missing or empty embedding can never hit the cache.
    pub fn probe(&self, query_embedding: Option<&[f32]>) -> Option<&[RetrievalResult]> {
        let embedding = query_embedding?;
        self.entries
            .iter()
            .filter_map(|entry| cosine_similarity(&entry.embedding, embedding).map(|sim| (sim, entry)))
            .filter(|(sim, _)| *sim >= self.similarity_threshold)
            .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, entry)| entry.results.as_slice())
    }

    /// Stores `results` under `query_embedding`, evicting the oldest entry
    /// first if the cache is already at capacity. A missing embedding is
    /// not cached — there is nothing to match future queries against.
    pub fn store(&mut self, query_embedding: Option<&[f32]>, results: Vec<RetrievalResult>) {
        let Some(embedding) = query_embedding else { return };
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(CacheEntry { embedding: embedding.to_vec(), results });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
