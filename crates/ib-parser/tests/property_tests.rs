//! Property tests for the operation-command grammar.
//!
//! Uses proptest to verify:
//! 1. Any `add`/`update` line built from arbitrary quoted values round-
//!    trips through `parse_lines` to the same row data.
//! 2. A `delete` line always carries no data, for any in-range row number.

use proptest::prelude::*;

use ib_core::{Operation, Panel, PanelType, SubItem};
use ib_parser::grammar::parse_lines;

fn panel(columns: usize) -> Panel {
    Panel {
        id: "p".to_string(),
        display_name: "P".to_string(),
        panel_type: PanelType::Basic,
        sub_items: (1..=columns).map(|i| SubItem { key: format!("c{i}"), display_name: format!("C{i}"), enabled: true }).collect(),
        enabled: true,
        memory_inject: false,
    }
}

// Printable ASCII minus quote and brace characters, so the generated value
// never closes the quoted span or the data block early.
fn arb_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}"
}

proptest! {
    #[test]
    fn add_line_round_trips_arbitrary_value(row in 1u32..1000, value in arb_value()) {
        let panels = vec![panel(1)];
        let line = format!(r#"add p({row} {{"1","{value}"}})"#);
        let ops = parse_lines(&line, &panels).unwrap();
        prop_assert_eq!(ops.len(), 1);
        prop_assert_eq!(ops[0].row, row);
        prop_assert_eq!(ops[0].operation.data().unwrap().get(&1).unwrap(), &value);
    }

    #[test]
    fn update_line_round_trips_arbitrary_value(row in 1u32..1000, value in arb_value()) {
        let panels = vec![panel(1)];
        let line = format!(r#"update p({row} {{"1","{value}"}})"#);
        let ops = parse_lines(&line, &panels).unwrap();
        prop_assert_eq!(ops.len(), 1);
        prop_assert!(matches!(ops[0].operation, Operation::Update { .. }));
    }

    #[test]
    fn delete_line_always_carries_no_data(row in 1u32..1000) {
        let panels = vec![panel(1)];
        let line = format!("delete p({row})");
        let ops = parse_lines(&line, &panels).unwrap();
        prop_assert_eq!(ops.len(), 1);
        prop_assert_eq!(&ops[0].operation, &Operation::Delete);
    }
}
