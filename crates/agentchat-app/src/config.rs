use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use agentchat_logging::get_agentchat_dir;
use agentchat_storage::{FileStore, SharedStore};
use agentchat_types::AgentProfile;

use crate::cli::Cli;

/// File name of the local store inside the data directory
pub const STORE_FILE: &str = "local_storage.json";

/// Resolve the agent profile: a TOML profile file wins over the built-in
/// name, then command-line overrides are applied.
pub fn resolve_profile(cli: &Cli) -> Result<AgentProfile> {
    let mut profile = match &cli.profile_file {
        Some(path) => load_profile_file(path)?,
        None => AgentProfile::builtin(&cli.profile)?,
    };

    if let Some(base_url) = &cli.base_url {
        profile.base_url = base_url.clone();
    }
    if let Some(use_kb) = cli.knowledge_base_override() {
        profile.use_knowledge_base = use_kb;
    }

    profile.validate()?;
    log::debug!(
        "Using agent profile '{}' at {}",
        profile.agent_name,
        profile.base_url
    );
    Ok(profile)
}

/// Read a custom profile; omitted fields take the generic defaults
pub fn load_profile_file(path: &Path) -> Result<AgentProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file {}", path.display()))?;
    let profile: AgentProfile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse profile file {}", path.display()))?;
    Ok(profile)
}

/// Path of the local store file, under `data_dir` or `~/.agentchat`
pub fn store_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_agentchat_dir().context("Failed to locate the agentchat data directory")?,
    };
    Ok(dir.join(STORE_FILE))
}

pub fn open_store(data_dir: Option<&Path>) -> Result<SharedStore> {
    let path = store_path(data_dir)?;
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open local store {}", path.display()))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentchat_storage::KeyValueStore;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_profile_with_overrides() {
        let cli = Cli::try_parse_from([
            "agentchat",
            "--profile",
            "aspect",
            "--base-url",
            "http://localhost:3000",
            "--use-kb",
        ])
        .unwrap();

        let profile = resolve_profile(&cli).unwrap();
        assert_eq!(profile.agent_name, "Aspect");
        assert_eq!(profile.base_url, "http://localhost:3000");
        assert!(profile.use_knowledge_base);
    }

    #[test]
    fn test_unknown_profile_is_an_error() {
        let cli = Cli::try_parse_from(["agentchat", "--profile", "zeta"]).unwrap();
        assert!(resolve_profile(&cli).is_err());
    }

    #[test]
    fn test_profile_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nova.toml");
        std::fs::write(
            &path,
            r#"
agent_name = "Nova"
display_name = "Nova Analytics"
storage_prefix = "nova_"
thinking_steps = [["Reading", "Writing"]]
quick_questions = ["What were last week's sales?"]
"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "agentchat",
            "--profile-file",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let profile = resolve_profile(&cli).unwrap();

        assert_eq!(profile.agent_name, "Nova");
        assert_eq!(profile.storage_prefix, "nova_");
        assert_eq!(profile.thinking_steps, vec![vec!["Reading".to_string(), "Writing".to_string()]]);
        assert_eq!(profile.base_url, agentchat_types::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_profile_file_with_empty_prefix_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "agent_name = \"Bad\"\nstorage_prefix = \"\"\n").unwrap();

        let cli = Cli::try_parse_from(["agentchat", "--profile-file", path.to_str().unwrap()]).unwrap();
        assert!(resolve_profile(&cli).is_err());
    }

    #[test]
    fn test_store_lives_in_data_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            store_path(Some(dir.path())).unwrap(),
            dir.path().join("local_storage.json")
        );

        let store = open_store(Some(dir.path())).unwrap();
        store.set("freeda_theme", "dark").unwrap();
        assert!(dir.path().join(STORE_FILE).exists());
    }
}
