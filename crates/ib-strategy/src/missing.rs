//! Per-panel missing-field detection.

use ib_core::{cell_is_empty, row_has_any_data, CurrentData, MissingField, MissingFieldReport, Panel};

/// Builds one report per enabled panel. A panel with every field fully
/// populated still gets a report, just with an empty `fields` vector.
pub fn detect(enabled_panels: &[Panel], current: &CurrentData) -> Vec<MissingFieldReport> {
    enabled_panels.iter().map(|panel| detect_panel(panel, current)).collect()
}

fn detect_panel(panel: &Panel, current: &CurrentData) -> MissingFieldReport {
    let rows = current.get(&panel.id).map(|t| t.as_slice()).unwrap_or(&[]);
    let columns = panel.column_count() as u32;

    let mut fields = Vec::new();
    for (idx, sub_item) in panel.sub_items.iter().enumerate() {
        let col = (idx + 1) as u32;

        if rows.is_empty() {
            // A panel with zero rows has every sub-item missing.
            fields.push(MissingField {
                key: sub_item.key.clone(),
                display_name: sub_item.display_name.clone(),
                empty_rows: 0,
                total_rows: 0,
                empty_percentage: 100.0,
                missing_rows: Vec::new(),
            });
            continue;
        }

        let mut empty_count = 0usize;
        let mut missing_rows = Vec::new();
        for (row_idx, row) in rows.iter().enumerate() {
            if cell_is_empty(row, col) {
                empty_count += 1;
                if row_has_any_data(row, 1..=columns) {
                    missing_rows.push((row_idx + 1) as u32);
                }
            }
        }

        let total_rows = rows.len();
        let empty_percentage = empty_count as f64 / total_rows as f64 * 100.0;
        let no_value_anywhere = empty_count == total_rows;
        let sparse = empty_percentage > 50.0;

        if !missing_rows.is_empty() || no_value_anywhere || sparse {
            fields.push(MissingField {
                key: sub_item.key.clone(),
                display_name: sub_item.display_name.clone(),
                empty_rows: empty_count,
                total_rows,
                empty_percentage,
                missing_rows,
            });
        }
    }

    MissingFieldReport { panel: panel.id.clone(), fields }
}
