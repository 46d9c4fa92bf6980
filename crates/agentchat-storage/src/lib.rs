//! Local key-value state for agentchat
//!
//! Stands in for browser local storage: a flat map of string keys to string
//! values, persisted as one JSON document. [`AgentStore`] layers the typed,
//! per-agent accessors on top of it.

use std::sync::Arc;
use thiserror::Error;

mod agent_store;
mod file_store;
mod memory_store;

pub use agent_store::{AgentStore, ChatMap};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid JSON: {source}")]
    CorruptFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("value under '{key}' is not valid JSON: {source}")]
    CorruptValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat string key-value store.
///
/// Methods take `&self` so one store can be shared by the chat client and the
/// history store, the way every script on a page shares local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in sorted order
    fn keys(&self) -> Vec<String>;
}

/// Shared handle to a store
pub type SharedStore = Arc<dyn KeyValueStore>;
