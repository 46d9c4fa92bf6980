//! Knowledge-base management for agentchat
//!
//! Lists an agent's knowledge bases and their files, creates knowledge bases,
//! uploads documents with tags and deletes them. Every mutation re-fetches
//! the lists from the server.

pub mod display;
pub mod duplicates;
pub mod manager;

use std::path::Path;

use thiserror::Error;

use agentchat_api::{ApiError, UploadFile};

pub use display::{file_icon, format_bytes, format_kb_date};
pub use duplicates::{detect_duplicate, parse_tags, DuplicateFlag, DuplicateReport};
pub use manager::KbManager;

#[derive(Debug, Error)]
pub enum KbError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("failed to upload {file}: {source}")]
    Upload {
        file: String,
        #[source]
        source: ApiError,
    },

    #[error("please enter a knowledge base name")]
    EmptyName,

    #[error("no knowledge base selected")]
    NoSelection,

    #[error("knowledge base '{0}' not found")]
    UnknownKnowledgeBase(String),

    #[error("please select files to upload")]
    NoFiles,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read a file from disk for upload, named by its final path component
pub async fn read_upload_file(path: &Path) -> Result<UploadFile, KbError> {
    let data = tokio::fs::read(path).await.map_err(|source| KbError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadFile::new(name, data))
}
