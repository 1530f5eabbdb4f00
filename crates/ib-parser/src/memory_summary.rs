//! Parser for the optional `<ai_memory_summary>` body: quoted key-value
//! lines (`"type": "ai_memory"`, `"content": "..."`, `"importance": 0..1`,
//! `"tags": [...]`, `"category": "..."`).
//!
//! Spec §6 documents the wire shape but no component in §4 names a caller;
//! this is surfaced as a standalone function and fed to `ib-retrieval`'s
//! memory ingestion path by the facade.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One parsed memory-summary stanza.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySummaryEntry {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
    pub importance: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
}

lazy_static! {
    static ref KV_LINE: Regex = Regex::new(r#"(?m)^\s*"(?P<key>[A-Za-z_]+)"\s*:\s*(?P<value>.+?),?\s*$"#).unwrap();
    static ref STRING_VALUE: Regex = Regex::new(r#"^"(.*)"$"#).unwrap();
    static ref ARRAY_STRINGS: Regex = Regex::new(r#""([^"]*)""#).unwrap();
}

/// Parses the unwrapped `<ai_memory_summary>` body. Stanzas are separated
/// by blank lines; a stanza with no `content` key is dropped rather than
/// surfaced as a half-populated entry.
pub fn parse_memory_summary(body: &str) -> Vec<MemorySummaryEntry> {
    body.split("\n\n")
        .map(parse_stanza)
        .filter(|entry| entry.content.is_some())
        .collect()
}

fn parse_stanza(stanza: &str) -> MemorySummaryEntry {
    let mut entry = MemorySummaryEntry::default();
    for caps in KV_LINE.captures_iter(stanza) {
        let key = &caps["key"];
        let raw_value = caps["value"].trim();
        match key {
            "type" => entry.kind = unquote(raw_value),
            "content" => entry.content = unquote(raw_value),
            "category" => entry.category = unquote(raw_value),
            "importance" => entry.importance = raw_value.parse::<f64>().ok(),
            "tags" => entry.tags = ARRAY_STRINGS.captures_iter(raw_value).map(|c| c[1].to_string()).collect(),
            _ => {}
        }
    }
    entry
}

fn unquote(value: &str) -> Option<String> {
    STRING_VALUE.captures(value).map(|c| c[1].to_string())
}
