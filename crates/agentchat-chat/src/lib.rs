//! Chat client for branded agents
//!
//! [`AgentClient`] drives one agent's conversation: it bootstraps the
//! conversation and user ids, streams replies into a [`ChatView`], keeps the
//! history list current through a [`HistoryStore`] and persists the theme and
//! client logo.

pub mod branding;
pub mod client;
pub mod format;
pub mod history;
pub mod view;

use thiserror::Error;

use agentchat_api::ApiError;
use agentchat_storage::StorageError;

pub use branding::{logo_data_url, logo_mime_type};
pub use client::{AgentClient, SendStatus};
pub use format::{auto_title, format_message, format_relative_date};
pub use history::{build_history_items, history_store, HistoryItem, HistoryStore, LocalHistory, RemoteHistory};
pub use view::ChatView;

/// Label shown in place of an empty history list
pub const EMPTY_HISTORY_LABEL: &str = "No chat history yet";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("not a valid conversation id: {0}")]
    InvalidConversationId(String),

    #[error("logo file is {size} bytes; the limit is {max} bytes (2 MB)")]
    LogoTooLarge { size: u64, max: u64 },

    #[error("unsupported logo image type: {0}")]
    UnsupportedLogo(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
