use std::path::Path;

use chrono::Utc;
use rand::seq::SliceRandom;

use agentchat_api::{ApiClient, StreamObserver, StreamOutcome, StreamRequest, UploadFile};
use agentchat_storage::AgentStore;
use agentchat_types::{
    is_valid_conversation_id, new_conversation_id, AgentProfile, ChatTranscript, Sender, Theme,
    FALLBACK_ERROR_MESSAGE,
};

use crate::branding::logo_data_url;
use crate::format::{auto_title, format_message};
use crate::history::{build_history_items, history_store, HistoryItem, HistoryStore};
use crate::view::ChatView;
use crate::ChatError;

/// What happened to a submitted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    /// Blank input; nothing was sent
    Ignored,
    Replied(StreamOutcome),
    /// The fallback message was shown; holds the underlying error text
    Failed(String),
}

/// Chat session for one agent profile
pub struct AgentClient<V: ChatView> {
    profile: AgentProfile,
    api: ApiClient,
    store: AgentStore,
    view: V,
    history: Box<dyn HistoryStore>,
    conversation_id: String,
    user_id: Option<String>,
    has_started_chat: bool,
}

/// Routes stream callbacks to the view and tracks the thinking placeholder
struct ViewObserver<'a, V: ChatView> {
    view: &'a mut V,
    thinking_open: bool,
}

impl<V: ChatView> StreamObserver for ViewObserver<'_, V> {
    fn on_first_chunk(&mut self) {
        if self.thinking_open {
            self.view.complete_thinking();
            self.thinking_open = false;
        }
        self.view.begin_bot_message();
    }

    fn on_chunk(&mut self, _delta: &str, full_text: &str) {
        self.view.update_bot_message(full_text);
    }
}

impl<V: ChatView> AgentClient<V> {
    /// Restore the current conversation id, or start a new one
    pub fn new(profile: AgentProfile, api: ApiClient, store: AgentStore, view: V) -> Result<Self, ChatError> {
        let conversation_id = match store.conversation_id() {
            Some(id) if is_valid_conversation_id(&id) => id,
            stored => {
                if let Some(bad) = stored {
                    log::warn!("Discarding invalid stored conversation id '{}'", bad);
                }
                let id = new_conversation_id();
                store.set_conversation_id(&id)?;
                id
            }
        };

        let user_id = store.user_id();
        let history = history_store(&api, &store, user_id.as_deref(), &profile.agent_name);

        Ok(Self {
            profile,
            api,
            store,
            view,
            history,
            conversation_id,
            user_id,
            has_started_chat: false,
        })
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// True when history goes to the server
    pub fn is_remote_history(&self) -> bool {
        self.history.is_remote()
    }

    // ========================================================================
    // Session bootstrap
    // ========================================================================

    /// Create a server user if none is cached.
    ///
    /// Failure is logged and leaves the client anonymous with local history.
    pub async fn initialize_user_id(&mut self) -> Option<String> {
        if let Some(user_id) = &self.user_id {
            log::info!("Using existing user ID: {}", user_id);
            return Some(user_id.clone());
        }

        match self.api.create_user().await {
            Ok(user_id) => {
                if let Err(e) = self.store.set_user_id(&user_id) {
                    log::warn!("Could not persist user ID: {}", e);
                }
                log::info!("User ID created: {}", user_id);
                self.history = history_store(&self.api, &self.store, Some(user_id.as_str()), &self.profile.agent_name);
                self.user_id = Some(user_id.clone());
                Some(user_id)
            }
            Err(e) => {
                log::error!("Error creating user ID, continuing with local history: {}", e);
                None
            }
        }
    }

    /// Show the current conversation if it has messages, else the welcome screen
    pub async fn resume(&mut self) -> Result<(), ChatError> {
        let id = self.conversation_id.clone();
        self.load_chat_messages(&id).await;
        self.refresh_history().await
    }

    /// Start a fresh conversation with a new id
    pub fn new_chat(&mut self) -> Result<(), ChatError> {
        let mut id = new_conversation_id();
        while id == self.conversation_id {
            id = new_conversation_id();
        }
        self.store.set_conversation_id(&id)?;
        self.conversation_id = id;
        self.has_started_chat = false;

        self.view.clear();
        self.view.show_welcome();
        Ok(())
    }

    pub async fn switch_to_chat(&mut self, id: &str) -> Result<(), ChatError> {
        if !is_valid_conversation_id(id) {
            return Err(ChatError::InvalidConversationId(id.to_string()));
        }
        self.store.set_conversation_id(id)?;
        self.conversation_id = id.to_string();
        self.load_chat_messages(id).await;
        self.refresh_history().await
    }

    async fn load_chat_messages(&mut self, id: &str) {
        let transcript = match self.history.get_chat(id).await {
            Ok(transcript) => transcript,
            Err(e) => {
                log::warn!("Error loading chat messages for {}: {}", id, e);
                None
            }
        };

        self.view.clear();
        match transcript {
            Some(chat) if !chat.is_empty() => {
                self.has_started_chat = true;
                for message in &chat.messages {
                    match message.sender {
                        Sender::User => self.view.show_user_message(&message.text),
                        Sender::Bot => self.view.show_bot_message(&format_message(&message.text)),
                    }
                }
            }
            _ => {
                self.has_started_chat = false;
                self.view.show_welcome();
            }
        }
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Send a message and stream the reply into the view.
    ///
    /// Remote failures never escape: the thinking placeholder is closed, any
    /// partial reply is dropped and the fallback message is shown.
    pub async fn send_message(&mut self, text: &str) -> SendStatus {
        let text = text.trim();
        if text.is_empty() {
            return SendStatus::Ignored;
        }

        let first_message = !self.has_started_chat;
        self.has_started_chat = true;

        self.view.show_user_message(text);
        let steps = self
            .profile
            .thinking_steps
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();
        self.view.show_thinking(&steps);

        let request = StreamRequest {
            message: text.to_string(),
            conversation_id: self.conversation_id.clone(),
            use_knowledge_base: self.profile.use_knowledge_base,
            user_id: self.user_id.clone(),
            agent_name: self.profile.agent_name.clone(),
        };

        let mut observer = ViewObserver {
            view: &mut self.view,
            thinking_open: true,
        };
        let result = self.api.stream_message(&request, &mut observer).await;
        let thinking_open = observer.thinking_open;

        let status = match result {
            Ok(outcome) => {
                if thinking_open {
                    // The reply carried no text
                    self.view.complete_thinking();
                }
                if outcome.chunks > 0 {
                    self.view.finalize_bot_message(&format_message(&outcome.text));
                }
                let reply = (outcome.chunks > 0).then_some(outcome.text.as_str());
                if let Err(e) = self
                    .history
                    .record_exchange(&self.conversation_id, text, reply)
                    .await
                {
                    log::warn!("Could not record exchange locally: {}", e);
                }
                SendStatus::Replied(outcome)
            }
            Err(e) => {
                log::error!("Error streaming reply: {}", e);
                if thinking_open {
                    self.view.complete_thinking();
                } else {
                    self.view.discard_bot_message();
                }
                self.view.show_error(FALLBACK_ERROR_MESSAGE);
                SendStatus::Failed(e.to_string())
            }
        };

        if first_message {
            self.apply_auto_title(text).await;
        }

        status
    }

    async fn apply_auto_title(&mut self, first_message: &str) {
        let title = auto_title(first_message);
        if let Err(e) = self.history.update_title(&self.conversation_id, &title).await {
            log::warn!("Error updating conversation title: {}", e);
            return;
        }
        if let Err(e) = self.refresh_history().await {
            log::warn!("Error refreshing history: {}", e);
        }
    }

    /// Upload files one at a time through the chat-side quick upload,
    /// reporting each result in the chat
    pub async fn upload_files(&mut self, files: Vec<UploadFile>) -> usize {
        let mut uploaded = 0;
        for file in files {
            self.view.show_bot_message(&format_message(&format!(
                "📄 Uploading \"{}\" to knowledge base...",
                file.name
            )));

            match self.api.quick_upload(&file).await {
                Ok(result) => {
                    uploaded += 1;
                    self.view.show_bot_message(&format_message(&format!(
                        "✅ **File uploaded successfully!**\n\nFile: {}\nStatus: {}\nFile ID: {}",
                        result.file_name, result.status, result.file_id
                    )));
                }
                Err(e) => {
                    log::error!("Upload of {} failed: {}", file.name, e);
                    self.view.show_bot_message(&format_message(&format!(
                        "❌ **Upload failed**\n\nSorry, there was an error uploading \"{}\". Please try again.",
                        file.name
                    )));
                }
            }
        }
        uploaded
    }

    // ========================================================================
    // History
    // ========================================================================

    pub async fn history_items(&self) -> Result<Vec<HistoryItem>, ChatError> {
        let chats = self.history.all_chats().await?;
        Ok(build_history_items(&chats, &self.conversation_id, Utc::now()))
    }

    pub async fn refresh_history(&mut self) -> Result<(), ChatError> {
        let items = self.history_items().await?;
        self.view.render_history(&items);
        Ok(())
    }

    pub async fn rename_chat(&mut self, id: &str, title: &str) -> Result<(), ChatError> {
        self.history.update_title(id, title).await?;
        self.refresh_history().await
    }

    /// Delete a conversation; deleting the active one starts a new chat
    pub async fn delete_chat(&mut self, id: &str) -> Result<(), ChatError> {
        if let Err(e) = self.history.delete_chat(id).await {
            if self.history.is_remote() {
                log::error!("Error deleting conversation {}: {}", id, e);
            } else {
                return Err(e);
            }
        }

        if id == self.conversation_id {
            self.new_chat()
        } else {
            self.refresh_history().await
        }
    }

    /// Messages of any conversation, for display outside the session
    pub async fn transcript(&self, id: &str) -> Result<Option<ChatTranscript>, ChatError> {
        self.history.get_chat(id).await
    }

    // ========================================================================
    // Theme and logo
    // ========================================================================

    pub fn load_theme(&mut self) -> Theme {
        let theme = self.store.theme();
        self.view.apply_theme(theme);
        theme
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, ChatError> {
        let theme = self.store.theme().toggled();
        self.store.set_theme(theme)?;
        self.view.apply_theme(theme);
        Ok(theme)
    }

    pub fn logo(&self) -> Option<String> {
        self.store.logo_data()
    }

    /// Show the saved logo, if any
    pub fn load_logo(&mut self) {
        let logo = self.store.logo_data();
        self.view.show_logo(logo.as_deref());
    }

    pub fn set_logo(&mut self, path: &Path) -> Result<(), ChatError> {
        let data_url = logo_data_url(path)?;
        self.store.set_logo_data(&data_url)?;
        self.view.show_logo(Some(&data_url));
        Ok(())
    }

    pub fn remove_logo(&mut self) -> Result<(), ChatError> {
        self.store.remove_logo_data()?;
        self.view.show_logo(None);
        Ok(())
    }
}
