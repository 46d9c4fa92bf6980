use serde::{Deserialize, Serialize};

use agentchat_types::{Conversation, KbFile, KnowledgeBase, Message, Sender};

// ============================================================================
// Chat
// ============================================================================

/// Body of the streaming chat request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub message: String,
    pub conversation_id: String,
    pub use_knowledge_base: bool,
    /// Sent as `null` for anonymous clients
    pub user_id: Option<String>,
    pub agent_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateUserResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationsResponse {
    #[serde(default)]
    pub conversations: Vec<ConversationSummary>,
}

/// Conversation row returned by the server's list endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub external_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub message_count: u32,
}

impl From<ConversationSummary> for Conversation {
    fn from(summary: ConversationSummary) -> Self {
        Conversation {
            id: summary.external_id,
            title: summary.title,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            message_count: summary.message_count,
            messages: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// One stored turn of a server-side conversation
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryMessage {
    pub content: String,
    pub role: String,
}

impl From<HistoryMessage> for Message {
    fn from(row: HistoryMessage) -> Self {
        Message {
            text: row.content,
            sender: Sender::from_role(&row.role),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TitleUpdate<'a> {
    pub title: &'a str,
}

// ============================================================================
// Knowledge bases
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KnowledgeBasesResponse {
    #[serde(default)]
    pub knowledge_bases: Vec<KnowledgeBase>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FilesResponse {
    #[serde(default)]
    pub files: Vec<KbFile>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateKbRequest<'a> {
    pub agent_name: &'a str,
    pub name: &'a str,
    pub description: &'a str,
}

/// A file read into memory for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
