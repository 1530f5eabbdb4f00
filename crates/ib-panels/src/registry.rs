//! Panel registry resolution.
//!
//! `list_enabled` resolves the set of enabled panels and their ordered
//! enabled sub-items from configuration. It is a pure function: two calls
//! with identical configuration produce byte-identical output, and a
//! missing configuration degrades to an empty list rather than throwing.

use std::collections::{BTreeMap, HashSet};

use ib_core::{ExtensionConfig, Panel, PanelConfig, PanelType, SubItem};

/// Resolve the enabled panel set from configuration.
///
/// Basic panels (`config.panels`) are listed before custom panels
/// (`config.customPanels`), each in the config map's key order — config
/// maps are `BTreeMap`, so iteration order is the sorted key order and is
/// therefore deterministic run to run.
pub fn list_enabled(config: &ExtensionConfig) -> Vec<Panel> {
    let mut panels = Vec::with_capacity(config.panels.len() + config.custom_panels.len());
    for (id, cfg) in &config.panels {
        if !cfg.enabled {
            continue;
        }
        panels.push(build_panel(id, PanelType::Basic, cfg));
    }
    for (id, cfg) in &config.custom_panels {
        if !cfg.enabled {
            continue;
        }
        panels.push(build_panel(id, PanelType::Custom, cfg));
    }
    panels
}

/// Merge a panel's two sub-item sources: checkbox-style config and an
/// explicit list. Duplicate keys are deduplicated, list-source winning
/// over checkbox-source.
fn build_panel(id: &str, panel_type: PanelType, cfg: &PanelConfig) -> Panel {
    let mut items: BTreeMap<String, SubItem> = BTreeMap::new();

    // Checkbox-source first, so the list-source pass below can overwrite it.
    for (key, entry) in &cfg.checkbox_items {
        if entry.enabled {
            items.insert(
                key.clone(),
                SubItem { key: key.clone(), display_name: entry.display_name.clone().unwrap_or_else(|| key.clone()), enabled: true },
            );
        }
    }

    // List-source: wins on key collision, and fixes the display order for
    // every key it names. An explicit `enabled: false` entry in the list
    // removes a same-keyed checkbox entry too — the list is authoritative.
    let mut list_order: Vec<String> = Vec::new();
    for sub_item in &cfg.sub_items {
        if sub_item.enabled {
            items.insert(
                sub_item.key.clone(),
                SubItem { key: sub_item.key.clone(), display_name: sub_item.display_name.clone(), enabled: true },
            );
            list_order.push(sub_item.key.clone());
        } else {
            items.remove(&sub_item.key);
        }
    }

    // Final order: list-named keys in their given order, then any
    // checkbox-only keys in sorted key order (BTreeMap iteration).
    let mut seen: HashSet<String> = HashSet::new();
    let mut sub_items = Vec::with_capacity(items.len());
    for key in &list_order {
        if let Some(item) = items.get(key) {
            if seen.insert(key.clone()) {
                sub_items.push(item.clone());
            }
        }
    }
    for (key, item) in &items {
        if seen.insert(key.clone()) {
            sub_items.push(item.clone());
        }
    }

    Panel {
        id: id.to_string(),
        display_name: cfg.display_name.clone().unwrap_or_else(|| id.to_string()),
        panel_type,
        sub_items,
        enabled: true,
        memory_inject: cfg.memory_inject,
    }
}
