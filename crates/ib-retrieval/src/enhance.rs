//! Query enhancement (§4.9 stage 2): prefixes recent conversation context
//! and appends a handful of static synonyms before retrieval runs.

use lazy_static::lazy_static;
use std::collections::HashMap;

const MAX_CONTEXT_CHARS: usize = 100;
const MAX_SYNONYMS: usize = 3;

lazy_static! {
    /// A small illustrative synonym table. A production deployment would
    /// source this from a domain thesaurus; the pipeline only needs *a*
    /// static map to append up to 3 entries from.
    static ref SYNONYMS: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert("happy", vec!["joyful", "content", "pleased"]);
        m.insert("sad", vec!["unhappy", "downcast", "sorrowful"]);
        m.insert("angry", vec!["furious", "irate", "annoyed"]);
        m.insert("friend", vec!["companion", "ally", "confidant"]);
        m.insert("enemy", vec!["foe", "rival", "adversary"]);
        m.insert("home", vec!["residence", "dwelling", "house"]);
        m
    };
}

/// Builds the enhanced query: `"conversation context: <recent messages>"`
/// prefix (when enabled and history is non-empty), the original query,
/// then up to 3 synonyms drawn from the static map for words the query
/// contains.
pub fn enhance_query(query: &str, conversation_history: &[String], context_window_size: usize) -> String {
    let mut parts = Vec::new();

    if !conversation_history.is_empty() {
        let recent: Vec<String> = conversation_history
            .iter()
            .rev()
            .take(context_window_size)
            .rev()
            .map(|msg| truncate(msg, MAX_CONTEXT_CHARS))
            .collect();
        if !recent.is_empty() {
            parts.push(format!("conversation context: {}", recent.join(" | ")));
        }
    }

    parts.push(query.to_string());

    let synonyms = synonyms_for(query);
    if !synonyms.is_empty() {
        parts.push(synonyms.join(", "));
    }

    parts.join(" ")
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn synonyms_for(query: &str) -> Vec<&'static str> {
    let lowered = query.to_lowercase();
    let mut found = Vec::new();
    for word in lowered.split_whitespace() {
        if let Some(syns) = SYNONYMS.get(word) {
            for syn in syns {
                if found.len() >= MAX_SYNONYMS {
                    return found;
                }
                found.push(*syn);
            }
        }
    }
    found
}
