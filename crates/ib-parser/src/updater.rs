//! DataUpdater (§4.8): normalizes row indices, applies `add`/`update`/
//! `delete` to panel arrays, and emits `data:updated`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use ib_core::{
    cell_is_empty, CoreEvent, CoreResult, DataEntry, HostContext, Operation, OperationCommand, Panel, PanelTable, Row,
};
use ib_panels::DataStore;

/// Per-`chatId` mutex table. `apply` locks the entry for its chat before
/// reading or writing any panel, so rapid-fire `message_received` events
/// for the same chat never interleave partial writes — across chats,
/// operations proceed independently (§5).
#[derive(Default)]
pub struct DataUpdater {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DataUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, chat_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(chat_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Applies every operation in `operations` to `chat_id`'s panel tables.
    ///
    /// Every touched panel's rows are read and transformed in memory first;
    /// writes only start once every operation has applied cleanly, so a
    /// read failure partway through a multi-operation reply leaves every
    /// panel's on-disk state untouched (§7: "abort this turn's apply;
    /// preserve prior state"). Per-panel writes themselves are atomic
    /// per `DataStore`'s contract (§4.2); this function does not add a
    /// cross-panel transaction on top of that.
    ///
    /// Returns the set of affected panel ids in first-touched order and
    /// emits `data:updated` on success. Does not emit `smart-prompt:error`
    /// itself — the caller owns `StatusReport` and decides how to surface
    /// a returned `Err` (§7's error-count bookkeeping lives at that layer).
    #[tracing::instrument(skip(self, store, host, operations))]
    pub async fn apply(
        &self,
        store: &dyn DataStore,
        host: &dyn HostContext,
        chat_id: &str,
        operations: &[OperationCommand],
        message_id: Option<String>,
        now_ms: i64,
    ) -> CoreResult<Vec<String>> {
        let chat_lock = self.lock_for(chat_id).await;
        let _guard = chat_lock.lock().await;

        let mut working: HashMap<String, PanelTable> = HashMap::new();
        let mut affected: Vec<String> = Vec::new();

        for op in operations {
            let mut rows = match working.remove(&op.panel) {
                Some(rows) => rows,
                None => store.get_panel_rows(&chat_id.to_string(), &op.panel).await?,
            };

            let target_idx = normalize_row(op.row, rows.len(), &op.operation);
            apply_one(&mut rows, target_idx, &op.operation);

            if !affected.contains(&op.panel) {
                affected.push(op.panel.clone());
            }
            working.insert(op.panel.clone(), rows);
        }

        for panel_id in &affected {
            let rows = working.remove(panel_id).unwrap_or_default();
            store.put_panel_rows(&chat_id.to_string(), panel_id, rows).await?;
        }

        let data_entry = DataEntry {
            data: serde_json::to_value(&affected).unwrap_or(serde_json::Value::Null),
            timestamp: now_ms,
            message_id,
            source: "model".to_string(),
        };
        host.emit(CoreEvent::PanelDataUpdated { data_entry, affected_panels: affected.clone(), timestamp: now_ms });

        Ok(affected)
    }
}

/// Row-index normalization (§4.8 step 2): `row < 1` targets `rowCount + 1`
/// for `add` (append after the last row), or row `1` for `update`/`delete`.
/// The grammar only ever produces `row >= 0` (no negative numbers), so
/// "less than 1" reduces to "equal to 0" here.
fn normalize_row(row: u32, row_count: usize, operation: &Operation) -> usize {
    if row >= 1 {
        (row - 1) as usize
    } else {
        match operation {
            Operation::Add { .. } => row_count,
            Operation::Update { .. } | Operation::Delete => 0,
        }
    }
}

fn ensure_len(rows: &mut PanelTable, len: usize) {
    while rows.len() < len {
        rows.push(Row::new());
    }
}

/// Executes one normalized operation against `rows` in place.
fn apply_one(rows: &mut PanelTable, idx: usize, operation: &Operation) {
    match operation {
        Operation::Add { data } => {
            ensure_len(rows, idx + 1);
            // "add" never overwrites a non-empty cell in an existing row
            // except via "update" (§3 invariants).
            for (&col, value) in data {
                if cell_is_empty(&rows[idx], col) {
                    rows[idx].insert(col, value.clone());
                }
            }
        }
        Operation::Update { data } => {
            ensure_len(rows, idx + 1);
            for (&col, value) in data {
                rows[idx].insert(col, value.clone());
            }
        }
        Operation::Delete => {
            // A delete on a non-existent row is a no-op, not an error.
            if idx < rows.len() {
                rows.remove(idx);
            }
        }
    }
}

/// Coerces a raw persisted panel value (§6: "either an array of row
/// objects, or a legacy object") into the canonical dense [`PanelTable`].
/// A host-backed `DataStore` calls this before ever handing rows to
/// [`DataUpdater::apply`]; the in-memory reference store never needs it
/// since it only ever stores the canonical shape.
///
/// Legacy flat records (object keyed by non-numeric field names) are
/// mapped through `panel`'s sub-item keys into column numbers — keys with
/// no matching sub-item are dropped. This resolves the spec's "preserves
/// original keys verbatim" language against this workspace's choice of
/// `Row = BTreeMap<u32, String>` (DESIGN.md records the rationale):
/// the canonical row can only address columns the currently enabled panel
/// defines, so a legacy key surviving "verbatim" means surviving under
/// the column number its key maps to, not as a free-form string key.
pub fn coerce_panel_table(value: &serde_json::Value, panel: &Panel) -> PanelTable {
    match value {
        serde_json::Value::Array(items) => items.iter().map(|item| coerce_row(item, panel)).collect(),
        serde_json::Value::Object(map) => {
            let all_numeric_keys = !map.is_empty() && map.keys().all(|k| k.parse::<u32>().is_ok());
            if all_numeric_keys {
                let mut entries: Vec<(u32, &serde_json::Value)> = map.iter().map(|(k, v)| (k.parse().unwrap(), v)).collect();
                entries.sort_by_key(|(n, _)| *n);
                entries.into_iter().map(|(_, v)| coerce_row(v, panel)).collect()
            } else {
                vec![legacy_flat_record_to_row(map, panel)]
            }
        }
        _ => PanelTable::new(),
    }
}

fn coerce_row(value: &serde_json::Value, panel: &Panel) -> Row {
    match value {
        serde_json::Value::Object(map) => legacy_flat_record_to_row(map, panel),
        _ => Row::new(),
    }
}

fn legacy_flat_record_to_row(map: &serde_json::Map<String, serde_json::Value>, panel: &Panel) -> Row {
    let mut row = Row::new();
    for (key, value) in map {
        let col = key.parse::<u32>().ok().or_else(|| panel.column_of(key));
        if let Some(col) = col {
            row.insert(col, value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()));
        }
    }
    row
}
