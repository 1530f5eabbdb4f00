//! Orchestrates extraction, classification, the forbidden-format guard,
//! and grammar parsing into the `{ format, operations[], metadata }`
//! shape §4.7 specifies as `ResponseParser`'s output.

use ib_core::{CoreError, CoreResult, OperationCommand, Panel};

use crate::extract::extract_tag;
use crate::format::{classify, forbidden_guard, BlockFormat};
use crate::grammar::parse_lines;
use crate::memory_summary::{parse_memory_summary, MemorySummaryEntry};

/// Which accepted shape the parsed block took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedFormat {
    OperationCommands,
    /// Pure key-value legacy textual form: accepted leniently, value-only,
    /// no operations extracted.
    Legacy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseMetadata {
    pub timestamp: i64,
    pub source: String,
    pub operation_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub format: ParsedFormat,
    pub operations: Vec<OperationCommand>,
    pub metadata: ParseMetadata,
}

pub struct ResponseParser;

impl ResponseParser {
    /// Extracts and validates the `<infobar_data>` block. `enabled_panels`
    /// is the current-turn registry snapshot (§4.1) operation commands are
    /// validated against. Any rejection is total: no partial operation
    /// list is returned alongside an error.
    #[tracing::instrument(skip(reply, enabled_panels))]
    pub fn parse(reply: &str, enabled_panels: &[Panel], source: &str, now_ms: i64) -> CoreResult<ParsedBlock> {
        let body = extract_tag(reply, "infobar_data")
            .ok_or_else(|| CoreError::FormatRejected("no <infobar_data> block found in reply".to_string()))?;

        match classify(&body) {
            BlockFormat::OperationCommands => {
                if let Some(reason) = forbidden_guard(&body) {
                    tracing::warn!(reason, "response rejected by strict forbidden-format guard");
                    return Err(CoreError::FormatRejected(format!("strict forbidden-format guard: {reason}")));
                }
                let operations = parse_lines(&body, enabled_panels)?;
                Ok(ParsedBlock {
                    format: ParsedFormat::OperationCommands,
                    metadata: ParseMetadata { timestamp: now_ms, source: source.to_string(), operation_count: operations.len() },
                    operations,
                })
            }
            BlockFormat::Legacy => Ok(ParsedBlock {
                format: ParsedFormat::Legacy,
                operations: Vec::new(),
                metadata: ParseMetadata { timestamp: now_ms, source: source.to_string(), operation_count: 0 },
            }),
            BlockFormat::Forbidden => {
                tracing::warn!("response rejected: forbidden JSON-like or legacy-XML markers");
                Err(CoreError::FormatRejected("forbidden JSON-like or legacy-XML markers detected".to_string()))
            }
            BlockFormat::Unknown => Err(CoreError::FormatRejected("unrecognized data block format".to_string())),
        }
    }

    /// Mirrors the `<infobar_data>` extraction logic for the think-process
    /// block, which must precede it in a well-formed reply.
    pub fn parse_think_process(reply: &str) -> Option<String> {
        extract_tag(reply, "aiThinkProcess")
    }

    /// Mirrors extraction for the optional memory-summary block.
    pub fn parse_memory_summary(reply: &str) -> Vec<MemorySummaryEntry> {
        extract_tag(reply, "ai_memory_summary").map(|body| parse_memory_summary(&body)).unwrap_or_default()
    }

    /// True when `<aiThinkProcess>` appears strictly before `<infobar_data>`
    /// in the raw reply, as the think/output contract (§4.5) mandates.
    pub fn think_process_precedes_data(reply: &str) -> bool {
        let think_idx = reply.to_lowercase().find("<aithinkprocess>");
        let data_idx = reply.to_lowercase().find("<infobar_data>");
        match (think_idx, data_idx) {
            (Some(t), Some(d)) => t < d,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_core::{PanelType, SubItem};

    fn panel(id: &str) -> Panel {
        Panel {
            id: id.to_string(),
            display_name: id.to_string(),
            panel_type: PanelType::Basic,
            sub_items: vec![
                SubItem { key: "name".into(), display_name: "Name".into(), enabled: true },
                SubItem { key: "age".into(), display_name: "Age".into(), enabled: true },
            ],
            enabled: true,
            memory_inject: false,
        }
    }

    #[test]
    fn full_first_turn_reply_parses_to_two_operations() {
        let reply = r#"<aiThinkProcess><!-- ... --></aiThinkProcess>
<infobar_data><!--
add personal(1 {"1","Alice","2","30"})
add world(1 {"1","City","2","Morning"})
--></infobar_data>"#;
        let panels = vec![panel("personal"), panel("world")];
        let parsed = ResponseParser::parse(reply, &panels, "model", 0).unwrap();
        assert_eq!(parsed.format, ParsedFormat::OperationCommands);
        assert_eq!(parsed.operations.len(), 2);
        assert_eq!(parsed.metadata.operation_count, 2);
        assert!(ResponseParser::think_process_precedes_data(reply));
    }

    #[test]
    fn forbidden_body_rejects_whole_block() {
        let reply = r#"<infobar_data>{"1.name":"Alice"}</infobar_data>"#;
        let panels = vec![panel("personal")];
        let err = ResponseParser::parse(reply, &panels, "model", 0).unwrap_err();
        assert!(matches!(err, CoreError::FormatRejected(_)));
    }

    #[test]
    fn missing_infobar_data_tag_is_rejected() {
        let panels = vec![panel("personal")];
        let err = ResponseParser::parse("no tags here", &panels, "model", 0).unwrap_err();
        assert!(matches!(err, CoreError::FormatRejected(_)));
    }

    #[test]
    fn legacy_key_value_body_accepted_leniently_with_no_operations() {
        let reply = "<infobar_data>姓名：爱丽丝\n年龄：30</infobar_data>";
        let panels = vec![panel("personal")];
        let parsed = ResponseParser::parse(reply, &panels, "model", 0).unwrap();
        assert_eq!(parsed.format, ParsedFormat::Legacy);
        assert!(parsed.operations.is_empty());
    }

    #[test]
    fn commented_body_yields_same_operations_as_uncommented() {
        let panels = vec![panel("personal")];
        let commented = ResponseParser::parse(
            "<infobar_data><!--add personal(1 {\"1\",\"v\"})--></infobar_data>",
            &panels,
            "model",
            0,
        )
        .unwrap();
        let plain =
            ResponseParser::parse("<infobar_data>add personal(1 {\"1\",\"v\"})</infobar_data>", &panels, "model", 0).unwrap();
        assert_eq!(commented.operations, plain.operations);
    }
}
