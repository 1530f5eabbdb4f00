//! Events emitted by the core, modeled as a tagged variant for the same
//! reason `OperationCommand` is: a `match` over event kinds stays
//! exhaustive as variants are added.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::RetrievalResult;

/// `chat.infobar_data` entry payload wrapped by `data:updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    pub data: Value,
    pub timestamp: i64,
    pub message_id: Option<String>,
    pub source: String,
}

/// Every identifier the core may emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CoreEvent {
    #[serde(rename = "smart-prompt:initialized")]
    Initialized { timestamp: i64 },

    #[serde(rename = "smart-prompt:data-updated")]
    DataUpdated { data: Value, timestamp: i64 },

    #[serde(rename = "smart-prompt:template-updated")]
    TemplateUpdated { timestamp: i64, reason: String },

    #[serde(rename = "smart-prompt:error")]
    Error { error: String, timestamp: i64, error_count: u32 },

    #[serde(rename = "data:updated")]
    PanelDataUpdated { data_entry: DataEntry, affected_panels: Vec<String>, timestamp: i64 },

    #[serde(rename = "contextual-retrieval:initialized")]
    RetrievalInitialized { timestamp: i64 },

    #[serde(rename = "contextual-retrieval:error")]
    RetrievalError { timestamp: i64, error: String, error_count: u32 },
}

/// Result bundle a hybrid search call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridSearchOutcome {
    pub results: Vec<RetrievalResult>,
    pub query: String,
    pub enhanced_query: String,
    pub retrieval_time_ms: u64,
    pub method: String,
    pub stats: RetrievalStats,
}

/// Observable counters for a retrieval run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalStats {
    pub cache_hits: u32,
    pub cache_misses: u32,
    pub vector_count: usize,
    pub keyword_count: usize,
    pub graph_count: usize,
    pub fused_count: usize,
    pub after_diversity_count: usize,
}
