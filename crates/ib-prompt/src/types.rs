use serde::{Deserialize, Serialize};

/// Which API surface a composed prompt (or a rule block) is destined for.
/// Interpolated into the rendered template at `{{OUTPUT_MODE}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    MainApi,
    CustomApi,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::MainApi => write!(f, "main-API"),
            OutputMode::CustomApi => write!(f, "custom-API"),
        }
    }
}

/// Resolved routing target for a module's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTarget {
    Main,
    Custom,
    Disabled,
}

/// Optional inputs to prompt composition that aren't part of the core
/// panel/strategy/missing-field trio.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions<'a> {
    /// Verbatim armor-breaking preface from config, already known to be
    /// non-empty when `Some`. Composition wraps it in fixed banners.
    pub armor_breaking_prompt: Option<&'a str>,
    /// Rendered memory-enhancement block from the retrieval/memory layers.
    pub memory_block: Option<&'a str>,
}
