use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Map a server-side role onto the two display tags.
    /// Only "user" is a user; assistant, system and anything else render as bot.
    pub fn from_role(role: &str) -> Self {
        if role == "user" {
            Sender::User
        } else {
            Sender::Bot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// A single chat message as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), sender: Sender::User }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { text: text.into(), sender: Sender::Bot }
    }
}

/// Conversation record, as listed in the history sidebar and as stored in the
/// local fallback map.
///
/// Timestamps stay in the string form they were produced in so a record
/// survives a save/load cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub message_count: u32,
    /// Only present in local-only mode, where nothing else remembers the messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl Conversation {
    /// New empty local record stamped with the current time
    pub fn new(id: impl Into<String>) -> Self {
        let now = now_iso();
        Self {
            id: id.into(),
            title: None,
            created_at: now.clone(),
            updated_at: Some(now),
            message_count: 0,
            messages: None,
        }
    }

    /// The timestamp used for ordering and relative-date display
    pub fn last_activity(&self) -> &str {
        self.updated_at.as_deref().unwrap_or(&self.created_at)
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => crate::UNTITLED_CONVERSATION,
        }
    }
}

/// The messages of one conversation, loaded for display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatTranscript {
    pub id: String,
    pub messages: Vec<Message>,
}

impl ChatTranscript {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Generate a fresh conversation id (UUID v4)
pub fn new_conversation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn is_valid_conversation_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Current UTC time in the ISO-8601 form the pages stored (millisecond precision)
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
