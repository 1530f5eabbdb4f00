//! ContextualRetrieval (C9): hybrid vector/keyword/graph memory search
//! with query enhancement, fusion, reranking, diversity filtering, and a
//! bounded semantic cache.

pub mod cache;
pub mod diversity;
pub mod enhance;
pub mod engine;
pub mod fuse;
pub mod rerank;
pub mod retrieve;
pub mod similarity;
pub mod types;

pub use cache::SemanticCache;
pub use engine::ContextualRetrieval;
pub use rerank::QueryHistory;
pub use types::{MemoryLayerSource, RetrievalOptions, VectorSearch};
