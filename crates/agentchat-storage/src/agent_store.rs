use std::collections::BTreeMap;

use agentchat_types::{keys, Conversation, Theme};

use crate::{SharedStore, StorageError};

/// Local fallback history: conversation id -> record
pub type ChatMap = BTreeMap<String, Conversation>;

/// Typed view of one agent's keys in a shared store.
///
/// Every key is the agent's storage prefix followed by one of the
/// [`agentchat_types::keys`] suffixes.
#[derive(Clone)]
pub struct AgentStore {
    store: SharedStore,
    prefix: String,
}

impl AgentStore {
    pub fn new(store: SharedStore, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.store.get(&self.key(keys::CURRENT_CONVERSATION_ID))
    }

    pub fn set_conversation_id(&self, id: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(keys::CURRENT_CONVERSATION_ID), id)
    }

    pub fn user_id(&self) -> Option<String> {
        self.store
            .get(&self.key(keys::USER_ID))
            .filter(|id| !id.is_empty())
    }

    pub fn set_user_id(&self, id: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(keys::USER_ID), id)
    }

    /// Saved theme, light when nothing was saved
    pub fn theme(&self) -> Theme {
        self.store
            .get(&self.key(keys::THEME))
            .map(|s| Theme::from_stored(&s))
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(&self.key(keys::THEME), theme.as_str())
    }

    /// Load the local chat history blob. A missing blob is an empty map.
    pub fn load_all_chats(&self) -> Result<ChatMap, StorageError> {
        let key = self.key(keys::CHAT_HISTORY);
        match self.store.get(&key) {
            Some(json) => serde_json::from_str(&json)
                .map_err(|source| StorageError::CorruptValue { key, source }),
            None => Ok(ChatMap::new()),
        }
    }

    pub fn save_all_chats(&self, chats: &ChatMap) -> Result<(), StorageError> {
        let key = self.key(keys::CHAT_HISTORY);
        let json = serde_json::to_string(chats).map_err(|source| StorageError::Serialize {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &json)
    }

    pub fn logo_data(&self) -> Option<String> {
        self.store.get(&self.key(keys::CLIENT_LOGO_DATA))
    }

    pub fn set_logo_data(&self, data_url: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(keys::CLIENT_LOGO_DATA), data_url)
    }

    pub fn remove_logo_data(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key(keys::CLIENT_LOGO_DATA))
    }
}
