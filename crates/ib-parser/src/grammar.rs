//! The operation-command grammar: tokenizes `op panel(row {"col","val",...})`
//! lines and validates them against the currently enabled panel set.
//!
//! Two independent layers, same separation the module doc for [`crate::format`]
//! calls out: this module's own regexes are deliberately lenient (any
//! string containing a digit normalizes to a column number) because the
//! [`crate::format::forbidden_guard`] pass already rejected the malformed
//! near-misses a strict grammar would otherwise need to police itself.

use lazy_static::lazy_static;
use regex::Regex;

use ib_core::{CoreError, CoreResult, Operation, OperationCommand, Panel, Row};

lazy_static! {
    static ref LINE: Regex = Regex::new(
        r#"(?i)^\s*(?P<op>add|update|delete)\s+(?P<panel>[A-Za-z0-9_\-]+)\s*\(\s*(?P<row>\d+)\s*(?:\{(?P<data>[\s\S]*)\})?\s*\)\s*$"#
    )
    .unwrap();
    static ref QUOTED: Regex = Regex::new(r#""([^"]*)""#).unwrap();
    static ref FIRST_DIGITS: Regex = Regex::new(r"\d+").unwrap();
}

/// Strips `//` and `#` line comments and blank lines, keeping candidate
/// operation-command lines in source order.
fn candidate_lines(body: &str) -> Vec<&str> {
    body.lines()
        .map(|line| {
            let without_slash = line.split("//").next().unwrap_or(line);
            without_slash.split('#').next().unwrap_or(without_slash)
        })
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Extracts `"col","val"` pairs from a data blob. ASCII and fullwidth
/// commas are both accepted as separators — since the column and value
/// tokens are located by matching quoted spans rather than by splitting on
/// a delimiter, the comma character used between them never matters.
/// Column tokens that contain no digit anywhere are dropped, not
/// misattributed to the next pair.
fn parse_pairs(data: &str) -> Row {
    let tokens: Vec<&str> = QUOTED.captures_iter(data).map(|c| c.get(1).unwrap().as_str()).collect();
    let mut row = Row::new();
    let mut iter = tokens.chunks_exact(2);
    for pair in &mut iter {
        let col_tok = pair[0];
        let value = pair[1];
        if let Some(col) = normalize_column_token(col_tok) {
            row.insert(col, value.to_string());
        }
    }
    row
}

/// `col_3`, `"3"`, and any string containing a digit all normalize to the
/// first integer found in the token.
fn normalize_column_token(tok: &str) -> Option<u32> {
    FIRST_DIGITS.find(tok).and_then(|m| m.as_str().parse().ok())
}

/// Parses every candidate line into an [`OperationCommand`], validating
/// each against `enabled_panels` (§4.7 blocking validation). The first
/// invalid line aborts the whole block — rejections are per-line but fail
/// the entire reply, matching the "stop applying remaining ops" policy.
pub fn parse_lines(body: &str, enabled_panels: &[Panel]) -> CoreResult<Vec<OperationCommand>> {
    let mut operations = Vec::new();
    for line in candidate_lines(body) {
        let caps = LINE.captures(line).ok_or_else(|| {
            CoreError::InvalidOperation(format!(
                "line does not match the operation-command grammar: {line:?}. allowed panels: {}",
                allowed_panel_names(enabled_panels)
            ))
        })?;

        let op = caps.name("op").unwrap().as_str().to_lowercase();
        let panel_id = caps.name("panel").unwrap().as_str();
        let row: u32 = caps.name("row").unwrap().as_str().parse().unwrap_or(0);
        let data_blob = caps.name("data").map(|m| m.as_str()).unwrap_or("");

        let panel = enabled_panels.iter().find(|p| p.id == panel_id).ok_or_else(|| {
            CoreError::InvalidOperation(format!(
                "panel {panel_id:?} is not in the enabled panel set. allowed panels: {}",
                allowed_panel_names(enabled_panels)
            ))
        })?;

        let data = parse_pairs(data_blob);
        let max_col = panel.column_count() as u32;
        if let Some(&bad_col) = data.keys().find(|&&c| c < 1 || c > max_col) {
            return Err(CoreError::InvalidOperation(format!(
                "column {bad_col} out of range for panel {panel_id:?} (1..={max_col})"
            )));
        }

        let operation = match op.as_str() {
            "add" => Operation::Add { data },
            "update" => Operation::Update { data },
            "delete" => Operation::Delete,
            _ => unreachable!("regex only matches add|update|delete"),
        };

        operations.push(OperationCommand { panel: panel_id.to_string(), row, operation });
    }
    Ok(operations)
}

fn allowed_panel_names(panels: &[Panel]) -> String {
    panels.iter().map(|p| p.id.as_str()).collect::<Vec<_>>().join(", ")
}
