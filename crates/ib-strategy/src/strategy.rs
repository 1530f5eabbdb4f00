//! Coverage measurement and full-vs-incremental strategy classification.

use ib_core::{cell_is_empty, CurrentData, Panel, StrategyType, UpdateStrategy};

/// Per-panel field accounting. `total` counts one conceptual row's worth of
/// columns even when the panel has zero actual rows, so an empty panel
/// still contributes to `totalFields` instead of vanishing from the
/// denominator.
fn panel_field_counts(panel: &Panel, current: &CurrentData) -> (usize, usize) {
    let columns = panel.column_count();
    let rows = current.get(&panel.id).map(|t| t.as_slice()).unwrap_or(&[]);
    let row_count = rows.len().max(1);
    let total = columns * row_count;

    let mut existing = 0usize;
    for row in rows {
        for col in 1..=columns as u32 {
            if !cell_is_empty(row, col) {
                existing += 1;
            }
        }
    }
    (total, existing)
}

/// Measures field coverage across the enabled panels and classifies the
/// turn as a full rewrite or an incremental update.
pub fn analyze(enabled_panels: &[Panel], current: &CurrentData) -> UpdateStrategy {
    let mut total_fields = 0usize;
    let mut existing_fields = 0usize;
    let mut panels_without_data = 0usize;

    for panel in enabled_panels {
        let (total, existing) = panel_field_counts(panel, current);
        total_fields += total;
        existing_fields += existing;
        let has_rows = current.get(&panel.id).map(|t| !t.is_empty()).unwrap_or(false);
        if !has_rows {
            panels_without_data += 1;
        }
    }

    let coverage: u8 = if total_fields == 0 {
        0
    } else {
        let pct = (existing_fields as f64 / total_fields as f64 * 100.0).round();
        pct.min(100.0) as u8
    };

    let (strategy_type, reason) = if coverage < 20 {
        (StrategyType::Full, "coverage below 20%".to_string())
    } else if coverage > 60 {
        (StrategyType::Incremental, "coverage above 60%".to_string())
    } else if enabled_panels.is_empty() {
        (StrategyType::Incremental, "no enabled panels".to_string())
    } else if panels_without_data * 2 > enabled_panels.len() {
        (StrategyType::Full, "more than half of enabled panels have no data".to_string())
    } else {
        (StrategyType::Incremental, "mixed coverage across panels".to_string())
    };

    UpdateStrategy { strategy_type, coverage, total_fields, existing_fields, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_core::{PanelType, Row, SubItem};

    fn panel(id: &str, columns: usize) -> Panel {
        Panel {
            id: id.to_string(),
            display_name: id.to_string(),
            panel_type: PanelType::Basic,
            sub_items: (1..=columns).map(|i| SubItem { key: format!("c{i}"), display_name: format!("C{i}"), enabled: true }).collect(),
            enabled: true,
            memory_inject: false,
        }
    }

    fn row(pairs: &[(u32, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn no_data_yields_zero_coverage_and_full_strategy() {
        let panels = vec![panel("personal", 2), panel("world", 2)];
        let current = CurrentData::new();
        let strategy = analyze(&panels, &current);
        assert_eq!(strategy.coverage, 0);
        assert_eq!(strategy.strategy_type, StrategyType::Full);
        assert_eq!(strategy.reason, "coverage below 20%");
    }

    #[test]
    fn high_coverage_yields_incremental() {
        let panels = vec![panel("personal", 2)];
        let mut current = CurrentData::new();
        current.insert("personal".into(), vec![row(&[(1, "Alice"), (2, "30")])]);
        let strategy = analyze(&panels, &current);
        assert_eq!(strategy.coverage, 100);
        assert!(strategy.coverage > 60);
        assert_eq!(strategy.strategy_type, StrategyType::Incremental);
    }

    #[test]
    fn boundary_coverage_exactly_20_is_not_full() {
        // 1 of 5 cells filled = 20% exactly; the threshold is a strict "<20".
        let panels = vec![panel("p", 5)];
        let mut current = CurrentData::new();
        current.insert("p".into(), vec![row(&[(1, "x")])]);
        let strategy = analyze(&panels, &current);
        assert_eq!(strategy.coverage, 20);
        assert_ne!(strategy.strategy_type, StrategyType::Full);
    }

    #[test]
    fn boundary_coverage_exactly_60_is_not_incremental_via_threshold() {
        let panels = vec![panel("p", 5)];
        let mut current = CurrentData::new();
        current.insert("p".into(), vec![row(&[(1, "a"), (2, "b"), (3, "c")])]);
        let strategy = analyze(&panels, &current);
        assert_eq!(strategy.coverage, 60);
        // 60 is not `> 60`, so this falls through to the mixed-coverage
        // branch rather than the high-coverage branch.
        assert_eq!(strategy.strategy_type, StrategyType::Incremental);
        assert_eq!(strategy.reason, "mixed coverage across panels");
    }

    #[test]
    fn majority_empty_panels_forces_full_in_mid_range() {
        let panels = vec![panel("a", 2), panel("b", 2), panel("c", 2)];
        let mut current = CurrentData::new();
        // One panel fully populated (overall coverage lands in the 20..=60
        // band), two panels with zero rows => majority without data.
        current.insert("a".into(), vec![row(&[(1, "x"), (2, "y")])]);
        let strategy = analyze(&panels, &current);
        assert!(strategy.coverage > 20 && strategy.coverage <= 60);
        assert_eq!(strategy.strategy_type, StrategyType::Full);
        assert_eq!(strategy.reason, "more than half of enabled panels have no data");
    }

    #[test]
    fn strategy_is_pure_function_of_inputs() {
        let panels = vec![panel("p", 2)];
        let mut current = CurrentData::new();
        current.insert("p".into(), vec![row(&[(1, "x")])]);
        let a = analyze(&panels, &current);
        let b = analyze(&panels, &current);
        assert_eq!(a, b);
    }
}
