use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use ib_core::{AnchorMode, ApiMode, HostContext, PromptPosition, TableRecordsConfig};

use crate::types::ApiTarget;

const ID_PROMPT: &str = "infobar:prompt";
const ID_MUST_OUTPUT: &str = "infobar:must_output_rules";
const ID_PROHIBITION: &str = "infobar:prohibition_rules";

/// Process-wide fallback slot (§7: "injection hook absent … fall back to
/// stashing the prompt in a process-wide slot the host may consume"), used
/// only when `HostContext::supports_extension_prompt` reports `false`.
fn stash() -> &'static Mutex<HashMap<String, String>> {
    static STASH: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    STASH.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Reads and removes a previously stashed prompt for `identifier`, for a
/// host that wires up its extension-prompt surface after this dispatcher
/// already tried and failed to use it directly.
pub fn take_stashed(identifier: &str) -> Option<String> {
    stash().lock().unwrap().remove(identifier)
}

fn stash_prompt(identifier: &str, text: &str) {
    stash().lock().unwrap().insert(identifier.to_string(), text.to_string());
}

fn anchor_slug(mode: AnchorMode) -> &'static str {
    match mode {
        AnchorMode::BeforeCharacter => "before_character",
        AnchorMode::AfterCharacter => "after_character",
        AnchorMode::AtDepthSystem => "at_depth_system",
        AnchorMode::AtDepthUser => "at_depth_user",
        AnchorMode::AtDepthAssistant => "at_depth_assistant",
    }
}

/// Builds the host extension-prompt identifier for a given base slot and
/// anchor, so concurrent in-flight injections at different anchors never
/// clobber each other.
fn identifier_for(base: &str, position: PromptPosition) -> String {
    format!("{base}:{}:{}", anchor_slug(position.mode), position.depth)
}

/// Resolves which API surface a module's output should target:
/// `custom` iff the mode is explicitly `custom`, or the mode is `auto` and
/// the global custom-API switch is on; `main` otherwise. A disabled module
/// targets neither.
pub fn resolve_api_target(enabled: bool, mode: ApiMode, global_custom_api_enabled: bool) -> ApiTarget {
    if !enabled {
        return ApiTarget::Disabled;
    }
    let wants_custom = mode == ApiMode::Custom || (mode == ApiMode::Auto && global_custom_api_enabled);
    if wants_custom {
        ApiTarget::Custom
    } else {
        ApiTarget::Main
    }
}

/// Inserts the composed prompt and rule blocks at the host's extension-
/// prompt surface and routes "table records" output between the main and
/// custom API according to its configured mode.
pub struct InjectionDispatcher;

impl InjectionDispatcher {
    /// Sets `identifier` through the host if it exposes a working hook;
    /// otherwise stashes `text` in the process-wide fallback slot.
    async fn set_or_stash(host: &dyn HostContext, identifier: &str, text: &str, priority: i32, position: PromptPosition) {
        if host.supports_extension_prompt() {
            host.set_extension_prompt(identifier, text, priority, position).await;
        } else {
            tracing::warn!(identifier, "host has no extension-prompt hook; stashing prompt");
            stash_prompt(identifier, text);
        }
    }

    /// Clears `identifier` through the host if it exposes a working hook;
    /// otherwise drops any stashed value for it.
    async fn clear_or_unstash(host: &dyn HostContext, identifier: &str) {
        if host.supports_extension_prompt() {
            host.clear_extension_prompt(identifier).await;
        } else {
            stash().lock().unwrap().remove(identifier);
        }
    }

    /// Inserts the composed prompt at `position`, independent of any
    /// rule-block routing.
    pub async fn inject_main(host: &dyn HostContext, prompt: &str, position: PromptPosition) {
        Self::set_or_stash(host, &identifier_for(ID_PROMPT, position), prompt, 0, position).await;
    }

    /// Applies the per-turn routing rules:
    /// - table records targets the main API → inject the prompt plus a
    ///   "must-output rules" block, clear any prohibition block.
    /// - table records targets the custom API → clear the must-output
    ///   block, inject a "prohibition rules" block.
    /// - table records is disabled → clear both rule blocks.
    pub async fn route(
        host: &dyn HostContext,
        table_records: &TableRecordsConfig,
        global_custom_api_enabled: bool,
        composed_prompt: &str,
        must_output_rules: &str,
        prohibition_rules: &str,
        position: PromptPosition,
    ) -> ApiTarget {
        let target = resolve_api_target(table_records.enabled, table_records.api_mode, global_custom_api_enabled);
        match target {
            ApiTarget::Main => {
                Self::inject_main(host, composed_prompt, position).await;
                Self::set_or_stash(host, &identifier_for(ID_MUST_OUTPUT, position), must_output_rules, 0, position).await;
                Self::clear_or_unstash(host, &identifier_for(ID_PROHIBITION, position)).await;
            }
            ApiTarget::Custom => {
                Self::clear_or_unstash(host, &identifier_for(ID_MUST_OUTPUT, position)).await;
                Self::set_or_stash(host, &identifier_for(ID_PROHIBITION, position), prohibition_rules, 0, position).await;
            }
            ApiTarget::Disabled => {
                Self::clear_or_unstash(host, &identifier_for(ID_MUST_OUTPUT, position)).await;
                Self::clear_or_unstash(host, &identifier_for(ID_PROHIBITION, position)).await;
            }
        }
        target
    }
}
