//! Read-only-to-the-core configuration types. These mirror the keys the
//! host's config layer owns; the core never persists config, it only
//! deserializes what the host hands it.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A single explicit-list sub-item entry: `{ key, displayName, enabled }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItemConfig {
    pub key: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A checkbox-style sub-item: an object field on the panel config whose
/// value carries `.enabled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxEntry {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

fn default_true() -> bool {
    true
}

/// One panel's raw configuration, either a basic built-in id or a
/// `customPanels[<key>]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "memoryInject", default)]
    pub memory_inject: bool,
    #[serde(rename = "subItems", default)]
    pub sub_items: Vec<SubItemConfig>,
    /// Checkbox-style fields: any object-valued key other than the
    /// recognized ones above is treated as a checkbox sub-item.
    #[serde(flatten, default)]
    pub checkbox_items: BTreeMap<String, CheckboxEntry>,
}

impl Default for CheckboxEntry {
    fn default() -> Self {
        Self { enabled: true, display_name: None }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            enabled: true,
            memory_inject: false,
            sub_items: Vec::new(),
            checkbox_items: BTreeMap::new(),
        }
    }
}

/// `apiConfig = { enabled, apiKey, model, provider, enableArmorBreaking,
/// armorBreakingPrompt }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<SecretString>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(rename = "enableArmorBreaking", default)]
    pub enable_armor_breaking: bool,
    #[serde(rename = "armorBreakingPrompt", default)]
    pub armor_breaking_prompt: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: None,
            provider: None,
            enable_armor_breaking: false,
            armor_breaking_prompt: None,
        }
    }
}

/// Which API surface a module's output targets, or `auto` to defer to the
/// global custom-API setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    Main,
    Custom,
    Auto,
}

/// `basic.tableRecords = { enabled, apiMode }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecordsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "apiMode", default = "default_api_mode")]
    pub api_mode: ApiMode,
}

fn default_api_mode() -> ApiMode {
    ApiMode::Main
}

impl Default for TableRecordsConfig {
    fn default() -> Self {
        Self { enabled: false, api_mode: ApiMode::Main }
    }
}

/// `memoryEnhancement.ai = { enabled, apiMode }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEnhancementConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "apiMode", default = "default_api_mode")]
    pub api_mode: ApiMode,
}

impl Default for MemoryEnhancementConfig {
    fn default() -> Self {
        Self { enabled: false, api_mode: ApiMode::Main }
    }
}

/// The five prompt-injection anchors a host may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorMode {
    BeforeCharacter,
    AfterCharacter,
    AtDepthSystem,
    AtDepthUser,
    AtDepthAssistant,
}

/// `promptPosition = { mode, depth }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPosition {
    pub mode: AnchorMode,
    pub depth: i32,
}

impl Default for PromptPosition {
    fn default() -> Self {
        Self { mode: AnchorMode::AtDepthSystem, depth: 0 }
    }
}

/// Top-level configuration the core recognizes. The host hands this in as
/// a deserialized value each turn; the core never reads a filesystem path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// `<extension>.<panelId>` entries.
    #[serde(default)]
    pub panels: BTreeMap<String, PanelConfig>,
    /// `<extension>.customPanels[<key>]` entries.
    #[serde(rename = "customPanels", default)]
    pub custom_panels: BTreeMap<String, PanelConfig>,
    #[serde(rename = "apiConfig", default)]
    pub api_config: ApiConfig,
    #[serde(default)]
    pub basic: BasicConfig,
    #[serde(rename = "memoryEnhancement", default)]
    pub memory_enhancement: MemoryEnhancementWrapper,
    #[serde(rename = "promptPosition", default)]
    pub prompt_position: PromptPosition,
    #[serde(rename = "promptTemplatePath", default)]
    pub prompt_template_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicConfig {
    #[serde(rename = "tableRecords", default)]
    pub table_records: TableRecordsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryEnhancementWrapper {
    #[serde(default)]
    pub ai: MemoryEnhancementConfig,
}
