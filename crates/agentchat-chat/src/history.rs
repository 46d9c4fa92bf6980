use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agentchat_api::ApiClient;
use agentchat_storage::{AgentStore, ChatMap};
use agentchat_types::{now_iso, ChatTranscript, Conversation, Message};

use crate::format::format_relative_date;
use crate::ChatError;

/// Conversation history, either on the server or in the local store.
///
/// Which backend is used is decided once, when the store is built, from
/// whether a user id exists.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn all_chats(&self) -> Result<ChatMap, ChatError>;

    /// Messages of one conversation, `None` when it is unknown
    async fn get_chat(&self, id: &str) -> Result<Option<ChatTranscript>, ChatError>;

    async fn update_title(&self, id: &str, title: &str) -> Result<(), ChatError>;

    async fn delete_chat(&self, id: &str) -> Result<(), ChatError>;

    /// Remember a completed exchange. `bot_text` is `None` when the reply
    /// carried no text.
    async fn record_exchange(&self, id: &str, user_text: &str, bot_text: Option<&str>) -> Result<(), ChatError>;

    /// True for the server-backed store
    fn is_remote(&self) -> bool;
}

// ============================================================================
// Local store
// ============================================================================

/// History kept in the `<prefix>chat_history` blob of the local store
pub struct LocalHistory {
    store: AgentStore,
}

impl LocalHistory {
    pub fn new(store: AgentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HistoryStore for LocalHistory {
    async fn all_chats(&self) -> Result<ChatMap, ChatError> {
        Ok(self.store.load_all_chats()?)
    }

    async fn get_chat(&self, id: &str) -> Result<Option<ChatTranscript>, ChatError> {
        let chats = self.store.load_all_chats()?;
        Ok(chats.get(id).map(|chat| ChatTranscript {
            id: chat.id.clone(),
            messages: chat.messages.clone().unwrap_or_default(),
        }))
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), ChatError> {
        let mut chats = self.store.load_all_chats()?;
        if let Some(chat) = chats.get_mut(id) {
            chat.title = Some(title.to_string());
            chat.updated_at = Some(now_iso());
            self.store.save_all_chats(&chats)?;
        }
        Ok(())
    }

    async fn delete_chat(&self, id: &str) -> Result<(), ChatError> {
        let mut chats = self.store.load_all_chats()?;
        if chats.remove(id).is_some() {
            self.store.save_all_chats(&chats)?;
        }
        Ok(())
    }

    async fn record_exchange(&self, id: &str, user_text: &str, bot_text: Option<&str>) -> Result<(), ChatError> {
        let mut chats = self.store.load_all_chats()?;
        let chat = chats
            .entry(id.to_string())
            .or_insert_with(|| Conversation::new(id));

        let messages = chat.messages.get_or_insert_with(Vec::new);
        messages.push(Message::user(user_text));
        if let Some(bot_text) = bot_text {
            messages.push(Message::bot(bot_text));
        }
        chat.message_count = messages.len() as u32;
        chat.updated_at = Some(now_iso());

        self.store.save_all_chats(&chats)?;
        Ok(())
    }

    fn is_remote(&self) -> bool {
        false
    }
}

// ============================================================================
// Server store
// ============================================================================

/// History kept by the server under the user's id, scoped by agent name
pub struct RemoteHistory {
    api: ApiClient,
    user_id: String,
    agent_name: String,
    fallback: LocalHistory,
}

impl RemoteHistory {
    pub fn new(api: ApiClient, user_id: impl Into<String>, agent_name: impl Into<String>, store: AgentStore) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            agent_name: agent_name.into(),
            fallback: LocalHistory::new(store),
        }
    }
}

#[async_trait]
impl HistoryStore for RemoteHistory {
    /// Falls back to the local blob when the server cannot be reached
    async fn all_chats(&self) -> Result<ChatMap, ChatError> {
        match self.api.list_conversations(&self.user_id, &self.agent_name).await {
            Ok(conversations) => Ok(conversations
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect()),
            Err(e) => {
                log::warn!("Error fetching chats from server, using local store: {}", e);
                self.fallback.all_chats().await
            }
        }
    }

    async fn get_chat(&self, id: &str) -> Result<Option<ChatTranscript>, ChatError> {
        let messages = self.api.conversation_history(id).await?;
        Ok(Some(ChatTranscript {
            id: id.to_string(),
            messages,
        }))
    }

    async fn update_title(&self, id: &str, title: &str) -> Result<(), ChatError> {
        Ok(self.api.update_conversation_title(id, title).await?)
    }

    async fn delete_chat(&self, id: &str) -> Result<(), ChatError> {
        Ok(self.api.delete_conversation(id).await?)
    }

    /// The server records exchanges itself while streaming
    async fn record_exchange(&self, _id: &str, _user_text: &str, _bot_text: Option<&str>) -> Result<(), ChatError> {
        Ok(())
    }

    fn is_remote(&self) -> bool {
        true
    }
}

/// Pick the backend for the given user id
pub fn history_store(
    api: &ApiClient,
    store: &AgentStore,
    user_id: Option<&str>,
    agent_name: &str,
) -> Box<dyn HistoryStore> {
    match user_id {
        Some(user_id) => Box::new(RemoteHistory::new(api.clone(), user_id, agent_name, store.clone())),
        None => Box::new(LocalHistory::new(store.clone())),
    }
}

// ============================================================================
// History list
// ============================================================================

/// One row of the history list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    pub date_label: String,
    pub active: bool,
}

/// Rows for the history list, newest activity first
pub fn build_history_items(chats: &ChatMap, active_id: &str, now: DateTime<Utc>) -> Vec<HistoryItem> {
    let mut sorted: Vec<&Conversation> = chats.values().collect();
    sorted.sort_by_key(|chat| {
        std::cmp::Reverse(
            DateTime::parse_from_rfc3339(chat.last_activity())
                .map(|d| d.timestamp_millis())
                .unwrap_or(i64::MIN),
        )
    });

    sorted
        .into_iter()
        .map(|chat| HistoryItem {
            id: chat.id.clone(),
            title: chat.display_title().to_string(),
            date_label: format_relative_date(chat.last_activity(), now),
            active: chat.id == active_id,
        })
        .collect()
}
