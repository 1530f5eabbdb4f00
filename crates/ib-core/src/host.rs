//! The host chat platform's surface, reduced to what the core actually
//! calls. Access to the host is encapsulated behind a single interface so
//! tests only need to satisfy that interface, never a real host.

use async_trait::async_trait;

use crate::config::PromptPosition;
use crate::events::CoreEvent;

/// Stable per-chat identifier, opaque to the core.
pub type ChatId = String;

/// The host chat platform, as seen by this core. An async trait so a real
/// chat host and a test double are interchangeable at every call site.
#[async_trait]
pub trait HostContext: Send + Sync {
    /// The chat currently in scope for this turn.
    fn chat_id(&self) -> ChatId;

    /// Sets an extension prompt slot. `identifier` distinguishes concurrent
    /// in-flight injections so they don't clobber each other.
    async fn set_extension_prompt(&self, identifier: &str, text: &str, priority: i32, position: PromptPosition);

    /// Clears a previously set extension prompt slot.
    async fn clear_extension_prompt(&self, identifier: &str);

    /// Emits a core event onto the host's event bus.
    fn emit(&self, event: CoreEvent);

    /// Whether this host exposes a working extension-prompt hook. Hosts
    /// always implement `set_extension_prompt`/`clear_extension_prompt` to
    /// satisfy the trait, but a given deployment may have no surface wired
    /// up behind them yet (e.g. during startup, before the chat UI has
    /// registered a slot). `InjectionDispatcher` checks this before calling
    /// either method and falls back to a process-wide stash slot when it
    /// returns `false` (§7: "injection hook absent").
    fn supports_extension_prompt(&self) -> bool {
        true
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records every call instead of talking to a real host. Used across
    /// this workspace's tests so each crate's tests need only satisfy
    /// `HostContext`.
    #[derive(Default)]
    pub struct RecordingHost {
        pub chat_id: String,
        pub prompts: Mutex<Vec<(String, String, i32, PromptPosition)>>,
        pub cleared: Mutex<Vec<String>>,
        pub events: Mutex<Vec<CoreEvent>>,
        /// When set, `supports_extension_prompt` reports `false` so tests
        /// can exercise the stash fallback without a real host that lacks
        /// the hook.
        pub hook_absent: bool,
    }

    impl RecordingHost {
        pub fn new(chat_id: impl Into<String>) -> Self {
            Self { chat_id: chat_id.into(), ..Default::default() }
        }

        pub fn without_extension_prompt_hook(chat_id: impl Into<String>) -> Self {
            Self { chat_id: chat_id.into(), hook_absent: true, ..Default::default() }
        }
    }

    #[async_trait]
    impl HostContext for RecordingHost {
        fn chat_id(&self) -> ChatId {
            self.chat_id.clone()
        }

        async fn set_extension_prompt(&self, identifier: &str, text: &str, priority: i32, position: PromptPosition) {
            self.prompts.lock().unwrap().push((identifier.to_string(), text.to_string(), priority, position));
        }

        async fn clear_extension_prompt(&self, identifier: &str) {
            self.cleared.lock().unwrap().push(identifier.to_string());
        }

        fn emit(&self, event: CoreEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn supports_extension_prompt(&self) -> bool {
            !self.hook_absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingHost;
    use super::*;
    use crate::config::AnchorMode;

    #[tokio::test]
    async fn recording_host_captures_prompt_and_events() {
        let host = RecordingHost::new("chat-1");
        host.set_extension_prompt(
            "main",
            "hello",
            1,
            PromptPosition { mode: AnchorMode::AtDepthSystem, depth: 4 },
        )
        .await;
        host.emit(CoreEvent::Initialized { timestamp: 0 });
        assert_eq!(host.chat_id(), "chat-1");
        assert_eq!(host.prompts.lock().unwrap().len(), 1);
        assert_eq!(host.events.lock().unwrap().len(), 1);
    }
}
