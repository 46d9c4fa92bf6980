use serde::{Deserialize, Serialize};

/// A knowledge base (server-side vector store) owned by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vector_store_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub total_size: u64,
    /// Filled in once the files of this knowledge base have been fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<KbFile>>,
}

/// A document stored in a knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbFile {
    pub openai_file_id: String,
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Response of the single-file quick upload used from the chat screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickUploadResult {
    pub file_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub file_id: String,
}
