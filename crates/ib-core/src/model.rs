//! Core data model: panels, panel tables, operation commands, update
//! strategy, missing-field reports, and the retrieval-facing types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single addressable row of a panel table. Keyed by 1-based column
/// number, matching sub-item order. `BTreeMap` (not `HashMap`) so that
/// serialized rows and test fixtures have deterministic key order — two
/// runs over identical input must produce byte-identical output, and an
/// unordered map would undermine that for any caller that serializes a
/// row for comparison or logging.
pub type Row = BTreeMap<u32, String>;

/// Whether a sub-item value at `col` counts as present. A missing row is
/// "empty"; an empty or whitespace-only string at a column is also "empty".
pub fn cell_is_empty(row: &Row, col: u32) -> bool {
    row.get(&col).map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// A row "has any data" if any of its configured columns is non-empty.
pub fn row_has_any_data(row: &Row, configured_cols: impl Iterator<Item = u32>) -> bool {
    configured_cols.into_iter().any(|c| !cell_is_empty(row, c))
}

/// A panel's content kind: `basic` panels are host-defined and built in;
/// `custom` panels are operator-configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    Basic,
    Custom,
}

/// One ordered column inside a panel (sub-item / field / column are the
/// same thing, named differently across configuration and output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItem {
    pub key: String,
    pub display_name: String,
    pub enabled: bool,
}

/// A named, ordered collection of sub-items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub display_name: String,
    pub panel_type: PanelType,
    pub sub_items: Vec<SubItem>,
    pub enabled: bool,
    pub memory_inject: bool,
}

impl Panel {
    /// Number of configured columns, i.e. `sub_items.len()`.
    pub fn column_count(&self) -> usize {
        self.sub_items.len()
    }

    /// 1-based column number for a sub-item key, if enabled and present.
    pub fn column_of(&self, key: &str) -> Option<u32> {
        self.sub_items.iter().position(|s| s.key == key).map(|i| (i + 1) as u32)
    }

    pub fn display_name_of_column(&self, col: u32) -> Option<&str> {
        let idx = col.checked_sub(1)? as usize;
        self.sub_items.get(idx).map(|s| s.display_name.as_str())
    }
}

/// A panel's rows for a single chat. Index 0 of the vector corresponds to
/// row 1.
pub type PanelTable = Vec<Row>;

/// The current-data snapshot handed to the strategy analyzer, missing-field
/// detector, and prompt composer: every enabled panel's table, keyed by
/// panel id. `BTreeMap` so snapshot comparisons and the composer's
/// "current data status" section iterate panels in a stable order
/// independent of the enabled-panel list's own order.
pub type CurrentData = BTreeMap<String, PanelTable>;

/// A single row mutation: `add`, `update`, or `delete`, modeled as a tagged
/// variant rather than a subtype hierarchy so a `match` on `kind()` stays
/// exhaustive as variants are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Add { data: Row },
    Update { data: Row },
    Delete,
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Update { .. } => "update",
            Operation::Delete => "delete",
        }
    }

    pub fn data(&self) -> Option<&Row> {
        match self {
            Operation::Add { data } | Operation::Update { data } => Some(data),
            Operation::Delete => None,
        }
    }
}

/// A parsed row mutation targeting one panel. Row numbers are 1-based;
/// row 0 is handled by normalization before this type is constructed, never
/// stored as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCommand {
    pub panel: String,
    pub row: u32,
    pub operation: Operation,
}

/// Whether a turn should rewrite a panel wholesale or patch it incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    Full,
    Incremental,
}

/// Coverage measurement and the resulting strategy choice for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStrategy {
    pub strategy_type: StrategyType,
    pub coverage: u8,
    pub total_fields: usize,
    pub existing_fields: usize,
    pub reason: String,
}

/// Per-sub-item missing-field detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingField {
    pub key: String,
    pub display_name: String,
    pub empty_rows: usize,
    pub total_rows: usize,
    pub empty_percentage: f64,
    /// 1-based row numbers whose row "has any data" yet this field is
    /// blank. Empty when the field is missing only due to overall
    /// blankness (no per-row culprits to list).
    pub missing_rows: Vec<u32>,
}

/// Per-panel missing-field report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingFieldReport {
    pub panel: String,
    pub fields: Vec<MissingField>,
}

/// A stored memory, owned by an external deep-memory collaborator; this
/// crate only reads and scores these, never writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    pub timestamp: i64,
    pub importance: f64,
    pub tags: Vec<String>,
    pub category: String,
    pub layer: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Which retrieval path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalSource {
    Vector,
    Keyword,
    Graph,
}

/// A scored retrieval hit. `sources` records every retrieval path that
/// surfaced this id, since the same memory can be found by more than one
/// path in a single hybrid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub id: String,
    pub content: String,
    pub score: f64,
    pub source: RetrievalSource,
    pub fused_score: f64,
    pub rerank_score: Option<f64>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub sources: Vec<RetrievalSource>,
}
