use std::sync::Arc;

use agentchat_api::ApiClient;
use agentchat_chat::{AgentClient, ChatView, HistoryItem};
use agentchat_storage::{AgentStore, MemoryStore};
use agentchat_types::{AgentProfile, Theme};

/// Everything the client asked the view to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    User(String),
    Thinking(usize),
    CompleteThinking,
    BeginBot,
    UpdateBot(String),
    FinalizeBot(String),
    DiscardBot,
    Bot(String),
    Error(String),
    Clear,
    Welcome,
    History(Vec<HistoryItem>),
    Theme(Theme),
    Logo(Option<String>),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn count(&self, wanted: &ViewEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }

    pub fn take(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ChatView for RecordingView {
    fn show_user_message(&mut self, text: &str) {
        self.events.push(ViewEvent::User(text.to_string()));
    }

    fn show_thinking(&mut self, steps: &[String]) {
        self.events.push(ViewEvent::Thinking(steps.len()));
    }

    fn complete_thinking(&mut self) {
        self.events.push(ViewEvent::CompleteThinking);
    }

    fn begin_bot_message(&mut self) {
        self.events.push(ViewEvent::BeginBot);
    }

    fn update_bot_message(&mut self, full_text: &str) {
        self.events.push(ViewEvent::UpdateBot(full_text.to_string()));
    }

    fn finalize_bot_message(&mut self, formatted: &str) {
        self.events.push(ViewEvent::FinalizeBot(formatted.to_string()));
    }

    fn discard_bot_message(&mut self) {
        self.events.push(ViewEvent::DiscardBot);
    }

    fn show_bot_message(&mut self, formatted: &str) {
        self.events.push(ViewEvent::Bot(formatted.to_string()));
    }

    fn show_error(&mut self, text: &str) {
        self.events.push(ViewEvent::Error(text.to_string()));
    }

    fn clear(&mut self) {
        self.events.push(ViewEvent::Clear);
    }

    fn show_welcome(&mut self) {
        self.events.push(ViewEvent::Welcome);
    }

    fn render_history(&mut self, items: &[HistoryItem]) {
        self.events.push(ViewEvent::History(items.to_vec()));
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.events.push(ViewEvent::Theme(theme));
    }

    fn show_logo(&mut self, data_url: Option<&str>) {
        self.events.push(ViewEvent::Logo(data_url.map(str::to_string)));
    }
}

pub fn aspect_store(raw: &Arc<MemoryStore>) -> AgentStore {
    AgentStore::new(raw.clone(), "aspect_")
}

/// Client over a fresh in-memory store pointed at `base_url`
pub fn client(base_url: &str, raw: &Arc<MemoryStore>) -> AgentClient<RecordingView> {
    AgentClient::new(
        AgentProfile::aspect(),
        ApiClient::new(base_url),
        aspect_store(raw),
        RecordingView::default(),
    )
    .unwrap()
}

pub fn sse_reply(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!("data: {}\n\n", serde_json::json!({ "chunk": chunk })));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
