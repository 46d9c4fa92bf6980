// Logging module - diagnostic logger setup and HTTP debug output
pub mod request_logger;

use std::path::PathBuf;
use thiserror::Error;

pub use request_logger::{log_request, log_response, log_stream_chunk};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to get home directory (HOME / USERPROFILE not set)")]
    NoHomeDir,

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Install the process-wide `log` backend.
///
/// `RUST_LOG` wins when set; otherwise the default level is `warn`, or `debug`
/// in verbose mode. Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = max_chars.saturating_sub(3);
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

/// Get or create the base agentchat directory (~/.agentchat)
pub fn get_agentchat_dir() -> Result<PathBuf, LoggingError> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| LoggingError::NoHomeDir)?;

    let dir = PathBuf::from(home_dir).join(".agentchat");

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;
    }

    Ok(dir)
}
