use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A panel-level natural-language rule set, sourced from a rule-manager
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelRule {
    pub panel: String,
    pub description: String,
    #[serde(default)]
    pub add_rule: Option<String>,
    #[serde(default)]
    pub update_rule: Option<String>,
    #[serde(default)]
    pub delete_rule: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
}

/// A field-level constraint, sourced from the same rule-manager
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub panel: String,
    pub field: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub rule_type: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
}

/// External collaborator that owns panel and field rules. `RuleCatalog`
/// never stores rules itself, only a rendered-text cache over what this
/// trait returns.
#[async_trait]
pub trait RuleProvider: Send + Sync {
    async fn panel_rules(&self) -> Vec<PanelRule>;
    async fn field_rules(&self) -> Vec<FieldRule>;
}

const SOFT_TTL_MS: i64 = 5 * 60 * 1000;

struct Cached {
    text: String,
    cached_at_ms: i64,
}

/// Renders panel and field rules as a human-readable section, caching the
/// result for a soft TTL so repeated `compose` calls within the same turn
/// don't re-fetch from the rule-manager collaborator.
pub struct RuleCatalog {
    cache: Mutex<Option<Cached>>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self { cache: Mutex::new(None) }
    }

    /// Invalidated by `panelRule:updated|deleted` and
    /// `fieldRule:updated|deleted` — callers should invoke this whenever
    /// one of those events arrives instead of waiting out the TTL.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap() = None;
    }

    /// Returns the cached rendering if it is still within the soft TTL as
    /// of `now_ms`; otherwise fetches fresh rules from `provider`, renders,
    /// and caches.
    pub async fn render(&self, provider: &dyn RuleProvider, now_ms: i64) -> String {
        if let Some(cached) = self.cache.lock().unwrap().as_ref() {
            if now_ms - cached.cached_at_ms < SOFT_TTL_MS {
                return cached.text.clone();
            }
        }

        let panel_rules = provider.panel_rules().await;
        let field_rules = provider.field_rules().await;
        let text = render_rules(&panel_rules, &field_rules);
        *self.cache.lock().unwrap() = Some(Cached { text: text.clone(), cached_at_ms: now_ms });
        text
    }
}

fn render_rules(panel_rules: &[PanelRule], field_rules: &[FieldRule]) -> String {
    if panel_rules.is_empty() && field_rules.is_empty() {
        return String::new();
    }

    let mut out = String::from("Rules:\n");
    for rule in panel_rules {
        out.push_str(&format!("- {}: {}\n", rule.panel, rule.description));
        if let Some(add) = &rule.add_rule {
            out.push_str(&format!("  add: {add}\n"));
        }
        if let Some(update) = &rule.update_rule {
            out.push_str(&format!("  update: {update}\n"));
        }
        if let Some(delete) = &rule.delete_rule {
            out.push_str(&format!("  delete: {delete}\n"));
        }
        if let Some(filter) = &rule.filter {
            out.push_str(&format!("  filter: {filter}\n"));
        }
    }
    for rule in field_rules {
        out.push_str(&format!("- {}.{}", rule.panel, rule.field));
        if let Some(ty) = &rule.rule_type {
            out.push_str(&format!(" ({ty})"));
        }
        if let Some(range) = &rule.range {
            out.push_str(&format!(" range {range}"));
        }
        if !rule.examples.is_empty() {
            out.push_str(&format!(" examples: {}", rule.examples.join(", ")));
        }
        out.push('\n');
    }
    out
}
