use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::io;

use agentchat_api::ApiClient;
use agentchat_chat::AgentClient;
use agentchat_kb::KbManager;
use agentchat_logging::init_logging;
use agentchat_storage::AgentStore;

mod cli;
mod commands;
mod config;
mod render;
mod repl;
mod terminal_view;

use cli::{Cli, Commands};
use terminal_view::TerminalView;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(shell) = cli.generate {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "agentchat", &mut io::stdout());
        return Ok(());
    }

    let profile = config::resolve_profile(&cli)?;
    let api = ApiClient::new(&profile.base_url).with_verbose(cli.verbose);
    let command = cli.command.take().unwrap_or(Commands::Chat { message: None });

    // Knowledge-base management needs neither the local store nor a session
    if let Commands::Kb { command } = command {
        let mut manager = KbManager::new(api, profile.agent_name.clone());
        return commands::run_kb(command, &mut manager).await;
    }

    let store = config::open_store(cli.data_dir.as_deref())?;
    let agent_store = AgentStore::new(store, profile.storage_prefix.clone());
    let view = TerminalView::new(&profile);
    let mut client = AgentClient::new(profile, api, agent_store, view)
        .context("Failed to restore the chat session")?;

    if needs_user(&command) {
        client.initialize_user_id().await;
    }

    commands::run_command(command, &mut client).await
}

/// Commands that talk to conversation history or the stream endpoint
fn needs_user(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Chat { .. } | Commands::History { .. } | Commands::NewChat
    )
}
