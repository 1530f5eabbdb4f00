//! Format classification and the strict forbidden-format guard.
//!
//! Two independent layers, kept separate deliberately (§9 design notes):
//! [`classify`] decides whether a body even looks like operation commands,
//! legacy key-value text, or something to reject outright; [`forbidden_guard`]
//! then runs over bodies classified as [`BlockFormat::OperationCommands`] to
//! catch near-miss syntaxes (unquoted columns, a row written outside the
//! parentheses, a missing row) that a lenient grammar parser would otherwise
//! half-accept.

use lazy_static::lazy_static;
use regex::Regex;

/// Result of classifying an unwrapped `<infobar_data>` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFormat {
    /// At least one `add|update|delete <word>(` line.
    OperationCommands,
    /// JSON-like or legacy-XML markers found with no operation lines.
    Forbidden,
    /// Plain `key: value` / `key：value` lines, no forbidden markers.
    Legacy,
    /// Neither a recognizable format nor something explicitly forbidden.
    Unknown,
}

lazy_static! {
    static ref OPERATION_LINE: Regex =
        Regex::new(r"(?im)^\s*(add|update|delete)\s+[A-Za-z0-9_\-]+\s*\(").unwrap();
    static ref DOTTED_JSON_KEY: Regex = Regex::new(r#""\d+\.[A-Za-z0-9_]+"\s*:"#).unwrap();
    static ref KEY_EQUALS_QUOTED: Regex = Regex::new(r#"[A-Za-z0-9_]+\s*=\s*""#).unwrap();
    static ref NPC_DOT: Regex = Regex::new(r"npc\d+\.").unwrap();
    static ref PANEL_COLON_EQUALS: Regex = Regex::new(r#"[A-Za-z0-9_]+\s*:\s*"[^"]*"\s*,"#).unwrap();
    static ref NESTED_XML_TAG: Regex = Regex::new(r"<([A-Za-z_][A-Za-z0-9_\-]*)>.*</\1>").unwrap();
    static ref BARE_OBJECT: Regex = Regex::new(r"^\s*\{[\s\S]*\}\s*$").unwrap();
    static ref LEGACY_KV_LINE: Regex = Regex::new(r"^[^\s:：]+[:：]\s*\S.*$").unwrap();

    static ref GUARD_ROW_OUTSIDE_PARENS: Regex =
        Regex::new(r"(?im)^\s*(add|update|delete)\s+[A-Za-z0-9_\-]+\s+\d+\s*\{").unwrap();
    static ref GUARD_COLUMN_UNQUOTED: Regex = Regex::new(r#"\{\s*\d+\s*,"#).unwrap();
    static ref GUARD_MISSING_ROW: Regex =
        Regex::new(r"(?im)^\s*(add|update|delete)\s+[A-Za-z0-9_\-]+\s*\(\s*\{").unwrap();
    static ref GUARD_LEGACY_XML: Regex = Regex::new(r#"="#).unwrap();
}

/// Does the body contain unambiguous JSON-like or legacy markers that are
/// forbidden regardless of whether an operation line is also present?
/// Used only to classify as [`BlockFormat::Forbidden`] when no operation
/// line exists — once an operation line is present, these same markers
/// become the concern of [`forbidden_guard`] instead.
fn has_forbidden_markers(body: &str) -> bool {
    DOTTED_JSON_KEY.is_match(body)
        || KEY_EQUALS_QUOTED.is_match(body)
        || NPC_DOT.is_match(body)
        || PANEL_COLON_EQUALS.is_match(body)
        || NESTED_XML_TAG.is_match(body)
        || BARE_OBJECT.is_match(body.trim())
}

fn is_legacy_key_value(body: &str) -> bool {
    let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return false;
    }
    lines.iter().all(|l| LEGACY_KV_LINE.is_match(l))
}

/// Classifies an unwrapped body in the order mandated by §4.7: operation
/// commands win over forbidden markers (a reply can mix a stray JSON aside
/// with real operation lines and still be accepted — the forbidden-guard
/// pass then polices the operation lines themselves), then forbidden, then
/// legacy key-value, then unknown.
pub fn classify(body: &str) -> BlockFormat {
    if OPERATION_LINE.is_match(body) {
        BlockFormat::OperationCommands
    } else if has_forbidden_markers(body) {
        BlockFormat::Forbidden
    } else if is_legacy_key_value(body) {
        BlockFormat::Legacy
    } else {
        BlockFormat::Unknown
    }
}

/// Runs once an operation-command body is about to be parsed. Any match is
/// a critical rejection of the whole block, distinct from per-line
/// validation failures (§4.7/§4.8): these are syntaxes that look enough
/// like the accepted grammar to fool a lenient parser.
pub fn forbidden_guard(body: &str) -> Option<&'static str> {
    if GUARD_ROW_OUTSIDE_PARENS.is_match(body) {
        return Some("row written outside the parentheses");
    }
    if GUARD_MISSING_ROW.is_match(body) {
        return Some("operation command is missing its row number");
    }
    for line in body.lines() {
        if OPERATION_LINE.is_match(line) && GUARD_COLUMN_UNQUOTED.is_match(line) {
            return Some("column token is not quoted");
        }
    }
    if GUARD_LEGACY_XML.is_match(body) && (NPC_DOT.is_match(body) || PANEL_COLON_EQUALS.is_match(body)) {
        return Some("unambiguous legacy XML syntax");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_line_classifies_as_operation_commands() {
        assert_eq!(classify("add personal(1 {\"1\",\"Alice\"})"), BlockFormat::OperationCommands);
    }

    #[test]
    fn dotted_json_key_classifies_as_forbidden() {
        assert_eq!(classify(r#"{"1.name":"Alice"}"#), BlockFormat::Forbidden);
    }

    #[test]
    fn npc_dot_syntax_is_forbidden() {
        assert_eq!(classify(r#"npc0.mood="happy""#), BlockFormat::Forbidden);
    }

    #[test]
    fn plain_key_value_lines_are_legacy() {
        assert_eq!(classify("姓名：爱丽丝\n年龄：30"), BlockFormat::Legacy);
    }

    #[test]
    fn empty_body_is_unknown() {
        assert_eq!(classify(""), BlockFormat::Unknown);
        assert_eq!(classify("   \n  "), BlockFormat::Unknown);
    }

    #[test]
    fn guard_rejects_row_outside_parentheses() {
        assert!(forbidden_guard("add p 1 {\"1\",\"v\"}").is_some());
    }

    #[test]
    fn guard_rejects_missing_row() {
        assert!(forbidden_guard(r#"add p({"1","v"})"#).is_some());
    }

    #[test]
    fn guard_rejects_unquoted_column() {
        assert!(forbidden_guard(r#"add p(1 {1,"v",2,"v"})"#).is_some());
    }

    #[test]
    fn guard_passes_well_formed_operation_line() {
        assert!(forbidden_guard(r#"add p(1 {"1","v","2","v"})"#).is_none());
    }
}
