//! Remote agent API client for agentchat
//!
//! This crate talks to the agent server: user creation, the streaming chat
//! endpoint, conversation history and the knowledge-base document store.
//! The [`sse`] module holds the incremental consumer for streamed replies.

pub mod client;
pub mod models;
pub mod sse;

use thiserror::Error;

pub use client::ApiClient;
pub use models::{
    ConversationSummary, HistoryMessage, StreamRequest, UploadFile,
};
pub use sse::{consume_stream, events, parse_line, SseDecoder, StreamEvent, StreamObserver, StreamOutcome};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// An `{"error": ...}` frame arrived in the reply stream
    #[error("server reported an error: {0}")]
    Server(String),

    #[error("error reading stream: {0}")]
    StreamRead(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status for errors that carry one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
