use ib_core::{cell_is_empty, CurrentData, MissingFieldReport, Panel, UpdateStrategy};

/// Reference schema line for one panel: `add <panel>(1 {"1","<displayName>","2","<displayName>", ...})`.
fn schema_line(panel: &Panel) -> String {
    let pairs: Vec<String> =
        panel.sub_items.iter().enumerate().map(|(i, item)| format!("\"{}\",\"{}\"", i + 1, item.display_name)).collect();
    format!("add {}(1 {{{}}})", panel.id, pairs.join(","))
}

/// The full-rewrite instruction template: forbids every non-OperationCommand
/// syntax and shows the only accepted format, one schema line per panel.
pub fn full_template(panels: &[Panel]) -> String {
    let mut out = String::new();
    out.push_str(
        "You are the data-extraction operator for this chat's tracked panels. \
         Output ONLY operation-command lines (`add`/`update`/`delete <panel>(row {...})`). \
         Do not emit JSON objects, key=value pairs, markdown lists, or nested XML — any other \
         syntax is rejected in full.\n",
    );
    out.push_str("Accepted format, one schema line per enabled panel:\n");
    for panel in panels {
        out.push_str(&schema_line(panel));
        out.push('\n');
    }
    out
}

/// The incremental instruction template: restates the row-numbering rule
/// and appends a per-panel "missing fields to supply" block.
pub fn incremental_template(panels: &[Panel], missing: &[MissingFieldReport]) -> String {
    let mut out = String::new();
    out.push_str(
        "Emit only changed fields as operation-command lines. Existing rows are numbered from 1; \
         new rows continue from the next integer.\n",
    );
    for report in missing {
        if report.fields.is_empty() {
            continue;
        }
        let panel_name = panels.iter().find(|p| p.id == report.panel).map(|p| p.display_name.as_str()).unwrap_or(&report.panel);
        out.push_str(&format!("Missing fields to supply for {panel_name}:\n"));
        for field in &report.fields {
            if field.missing_rows.is_empty() {
                out.push_str(&format!("  - {} ({:.0}% empty)\n", field.display_name, field.empty_percentage));
            } else {
                let rows: Vec<String> = field.missing_rows.iter().map(|r| r.to_string()).collect();
                out.push_str(&format!("  - {} missing at row(s) {}\n", field.display_name, rows.join(", ")));
            }
        }
    }
    out
}

/// Per-panel current-data status: "no data yet" with a field count, or a
/// unified row view of existing rows annotated with sub-item display names.
pub fn current_data_section(panels: &[Panel], current: &CurrentData) -> String {
    let mut out = String::from("Current data status:\n");
    for panel in panels {
        let rows = current.get(&panel.id).map(|t| t.as_slice()).unwrap_or(&[]);
        if rows.is_empty() {
            out.push_str(&format!("- {}: no data yet ({} fields to produce)\n", panel.display_name, panel.column_count()));
            continue;
        }
        out.push_str(&format!("- {}:\n", panel.display_name));
        for (row_idx, row) in rows.iter().enumerate() {
            let cells: Vec<String> = panel
                .sub_items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let col = (i + 1) as u32;
                    let value = if cell_is_empty(row, col) { "".to_string() } else { row.get(&col).cloned().unwrap_or_default() };
                    format!("{}={}", item.display_name, value)
                })
                .collect();
            out.push_str(&format!("  row {}: {}\n", row_idx + 1, cells.join(", ")));
        }
    }
    out
}

/// The fixed think/output contract: two adjacent tags, five fixed step
/// names the model must not rename.
pub fn think_output_contract() -> String {
    "Reply with two adjacent tags, in this order:\n\
     <aiThinkProcess>\n\
     1. update-strategy\n\
     2. plot analysis\n\
     3. data-change identification\n\
     4. update-strategy decision\n\
     5. completeness check\n\
     6. quality verification\n\
     </aiThinkProcess>\n\
     <infobar_data>\n\
     ...operation commands...\n\
     </infobar_data>\n"
        .to_string()
}

/// Single-sentence rationale for the chosen strategy, e.g. "coverage 73%, emit changes only".
pub fn rationale_sentence(strategy: &UpdateStrategy) -> String {
    let action = match strategy.strategy_type {
        ib_core::StrategyType::Full => "emit complete data",
        ib_core::StrategyType::Incremental => "emit changes only",
    };
    format!("coverage {}%, {}", strategy.coverage, action)
}

/// Final check-list of every enabled panel, appended in full mode only.
pub fn checklist(panels: &[Panel]) -> String {
    let mut out = String::from("Check-list — confirm every panel below before finishing:\n");
    for panel in panels {
        out.push_str(&format!("[ ] {}\n", panel.display_name));
    }
    out
}
