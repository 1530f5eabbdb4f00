//! Storage adapter for a chat's panel data.
//!
//! Modeled as an `async_trait` so the facade can compose against either a
//! real host-backed store or [`InMemoryDataStore`] — the latter is shipped
//! for tests and as a reference implementation; a production persistence
//! layer is the host's concern, not this crate's.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ib_core::{ChatId, CoreError, CoreResult, PanelTable};

/// `chat.infobar_data.panels[panelId]`, already coerced to the canonical
/// dense-row shape. Legacy on-disk shapes are the concern of `ib-parser`'s
/// `DataUpdater`, which normalizes before ever calling `put_panel_rows`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatData {
    pub panels: BTreeMap<String, PanelTable>,
}

/// Reads and writes a chat's panel rows. Writes are atomic at the
/// granularity of a single panel.
#[async_trait]
pub trait DataStore: Send + Sync {
    fn chat_id(&self) -> ChatId;
    async fn read_chat(&self, chat_id: &ChatId) -> CoreResult<ChatData>;
    async fn write_chat(&self, chat_id: &ChatId, chat: ChatData) -> CoreResult<()>;
    async fn get_panel_rows(&self, chat_id: &ChatId, panel_id: &str) -> CoreResult<PanelTable>;
    async fn put_panel_rows(&self, chat_id: &ChatId, panel_id: &str, rows: PanelTable) -> CoreResult<()>;
}

/// Reference `DataStore` backed by an in-process map. Not a production
/// store — persistence is the host's concern — it exists so this
/// workspace's tests and examples have something to run against.
#[derive(Default)]
pub struct InMemoryDataStore {
    chat_id: String,
    chats: Mutex<BTreeMap<ChatId, ChatData>>,
}

impl InMemoryDataStore {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self { chat_id: chat_id.into(), chats: Mutex::new(BTreeMap::new()) }
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    fn chat_id(&self) -> ChatId {
        self.chat_id.clone()
    }

    async fn read_chat(&self, chat_id: &ChatId) -> CoreResult<ChatData> {
        Ok(self.chats.lock().map_err(|e| CoreError::DataStoreIo(e.to_string()))?.get(chat_id).cloned().unwrap_or_default())
    }

    async fn write_chat(&self, chat_id: &ChatId, chat: ChatData) -> CoreResult<()> {
        self.chats.lock().map_err(|e| CoreError::DataStoreIo(e.to_string()))?.insert(chat_id.clone(), chat);
        Ok(())
    }

    async fn get_panel_rows(&self, chat_id: &ChatId, panel_id: &str) -> CoreResult<PanelTable> {
        let chats = self.chats.lock().map_err(|e| CoreError::DataStoreIo(e.to_string()))?;
        Ok(chats.get(chat_id).and_then(|c| c.panels.get(panel_id)).cloned().unwrap_or_default())
    }

    async fn put_panel_rows(&self, chat_id: &ChatId, panel_id: &str, rows: PanelTable) -> CoreResult<()> {
        let mut chats = self.chats.lock().map_err(|e| CoreError::DataStoreIo(e.to_string()))?;
        chats.entry(chat_id.clone()).or_default().panels.insert(panel_id.to_string(), rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_panel_rows() {
        let store = InMemoryDataStore::new("chat-1");
        let chat_id = store.chat_id();
        let mut row = ib_core::Row::new();
        row.insert(1, "Alice".into());
        store.put_panel_rows(&chat_id, "personal", vec![row.clone()]).await.unwrap();

        let rows = store.get_panel_rows(&chat_id, "personal").await.unwrap();
        assert_eq!(rows, vec![row]);
    }

    #[tokio::test]
    async fn missing_panel_reads_as_empty_not_error() {
        let store = InMemoryDataStore::new("chat-1");
        let chat_id = store.chat_id();
        let rows = store.get_panel_rows(&chat_id, "nonexistent").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn write_chat_then_read_chat_round_trips() {
        let store = InMemoryDataStore::new("chat-1");
        let chat_id = store.chat_id();
        let mut chat = ChatData::default();
        chat.panels.insert("world".into(), vec![ib_core::Row::new()]);
        store.write_chat(&chat_id, chat.clone()).await.unwrap();
        assert_eq!(store.read_chat(&chat_id).await.unwrap(), chat);
    }
}
