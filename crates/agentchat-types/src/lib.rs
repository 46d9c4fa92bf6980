//! Core types and structures for agentchat
//!
//! This crate provides the data model shared by every agentchat crate:
//! conversations and messages, knowledge-base records, agent profiles and the
//! names of the keys kept in the local store.

use serde::{Deserialize, Serialize};

pub mod conversation;
pub mod kb;
pub mod profile;

pub use conversation::{
    is_valid_conversation_id, new_conversation_id, now_iso, ChatTranscript, Conversation,
    Message, Sender,
};
pub use kb::{KbFile, KnowledgeBase, QuickUploadResult};
pub use profile::{AgentProfile, ProfileError, DEFAULT_BASE_URL};

// ============================================================================
// Constants
// ============================================================================

/// The single user-visible message shown whenever a reply could not be produced
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";

/// Largest logo file accepted for upload (2 MiB)
pub const MAX_LOGO_BYTES: u64 = 2 * 1024 * 1024;

/// Number of characters of the first user message kept as the chat title
pub const TITLE_MAX_CHARS: usize = 50;

/// Title shown for conversations that never received one
pub const UNTITLED_CONVERSATION: &str = "New Conversation";

// ============================================================================
// Local store keys
// ============================================================================

/// Key suffixes for per-agent state. The agent's storage prefix is prepended.
pub mod keys {
    pub const CURRENT_CONVERSATION_ID: &str = "current_conversation_id";
    pub const USER_ID: &str = "user_id";
    pub const THEME: &str = "theme";
    pub const CHAT_HISTORY: &str = "chat_history";
    pub const CLIENT_LOGO_DATA: &str = "client_logo_data";
}

// ============================================================================
// Theme
// ============================================================================

/// Colour theme persisted per agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than "dark" reads as the light theme
    pub fn from_stored(s: &str) -> Self {
        match s {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
