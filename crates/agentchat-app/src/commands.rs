// One-shot subcommands
use anyhow::{bail, Context, Result};
use chrono::Local;
use colored::Colorize;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use agentchat_api::UploadFile;
use agentchat_chat::{format_message, AgentClient, ChatView, HistoryItem};
use agentchat_kb::{detect_duplicate, file_icon, format_bytes, format_kb_date, read_upload_file, KbManager};
use agentchat_types::{is_valid_conversation_id, KbFile, Sender};

use crate::cli::{Commands, HistoryCommands, KbCommands, LogoCommands, ThemeCommands};
use crate::terminal_view::TerminalView;

/// Print a failed step without ending the session
pub fn report<E: Display>(result: Result<(), E>) {
    if let Err(e) = result {
        eprintln!("{} {}", "❌".bright_red(), e);
    }
}

/// Find a conversation by 1-based list position or by id.
///
/// Ids that are not in the list are accepted when they are valid UUIDs.
pub fn resolve_chat(items: &[HistoryItem], target: &str) -> Option<String> {
    if let Ok(n) = target.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| items.get(i))
            .map(|item| item.id.clone());
    }
    if items.iter().any(|item| item.id == target) || is_valid_conversation_id(target) {
        return Some(target.to_string());
    }
    None
}

/// Read upload files from disk, reporting and skipping unreadable ones
pub async fn read_files(paths: &[PathBuf]) -> Vec<UploadFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match read_upload_file(path).await {
            Ok(file) => files.push(file),
            Err(e) => eprintln!("{} {}", "❌".bright_red(), e),
        }
    }
    files
}

/// Run a chat-side subcommand against an initialized client
pub async fn run_command(command: Commands, client: &mut AgentClient<TerminalView>) -> Result<()> {
    match command {
        Commands::Chat { message: Some(text) } => {
            client.load_theme();
            client.send_message(&text).await;
        }
        Commands::Chat { message: None } => crate::repl::run_repl(client).await?,
        Commands::NewChat => {
            client.new_chat()?;
            println!("{} New conversation {}", "✓".bright_green(), client.conversation_id());
        }
        Commands::History { command } => run_history(command, client).await?,
        Commands::Theme { command } => {
            let theme = match command {
                ThemeCommands::Show => client.load_theme(),
                ThemeCommands::Toggle => client.toggle_theme()?,
            };
            println!("{} Theme: {}", "🌓".bright_cyan(), theme);
        }
        Commands::Logo { command } => match command {
            LogoCommands::Set { path } => client
                .set_logo(&path)
                .with_context(|| format!("Failed to set logo from {}", path.display()))?,
            LogoCommands::Remove => client.remove_logo()?,
            LogoCommands::Show => client.load_logo(),
        },
        Commands::Upload { files } => {
            let files = read_files(&files).await;
            if files.is_empty() {
                bail!("No readable files to upload");
            }
            let total = files.len();
            let uploaded = client.upload_files(files).await;
            if uploaded < total {
                bail!("{} of {} uploads failed", total - uploaded, total);
            }
        }
        Commands::Kb { .. } => bail!("Knowledge-base commands do not use the chat client"),
    }
    Ok(())
}

async fn run_history(command: HistoryCommands, client: &mut AgentClient<TerminalView>) -> Result<()> {
    if let HistoryCommands::List = command {
        client.view_mut().request_history();
        client.refresh_history().await?;
        return Ok(());
    }

    let items = client.history_items().await?;
    let target = match &command {
        HistoryCommands::Show { chat }
        | HistoryCommands::Rename { chat, .. }
        | HistoryCommands::Delete { chat }
        | HistoryCommands::Switch { chat } => chat,
        HistoryCommands::List => return Ok(()),
    };
    let Some(id) = resolve_chat(&items, target) else {
        bail!("No conversation '{}' (see `agentchat history list`)", target);
    };

    match command {
        HistoryCommands::Show { .. } => {
            let transcript = client
                .transcript(&id)
                .await?
                .filter(|t| !t.is_empty());
            let Some(transcript) = transcript else {
                println!("{}", "No messages in this conversation".bright_black());
                return Ok(());
            };
            let view = client.view_mut();
            for message in &transcript.messages {
                match message.sender {
                    Sender::User => view.show_user_message(&message.text),
                    Sender::Bot => view.show_bot_message(&format_message(&message.text)),
                }
            }
        }
        HistoryCommands::Rename { title, .. } => {
            client.rename_chat(&id, &title).await?;
            println!("{} Renamed to \"{}\"", "✓".bright_green(), title);
        }
        HistoryCommands::Delete { .. } => {
            client.delete_chat(&id).await?;
            println!("{} Conversation deleted", "🗑️".bright_green());
        }
        HistoryCommands::Switch { .. } => {
            client.switch_to_chat(&id).await?;
        }
        HistoryCommands::List => {}
    }
    Ok(())
}

// ============================================================================
// Knowledge bases
// ============================================================================

pub async fn run_kb(command: KbCommands, manager: &mut KbManager) -> Result<()> {
    match command {
        KbCommands::List => {
            let kbs = manager.load().await?;
            if kbs.is_empty() {
                println!("{}", "No knowledge bases yet".bright_black());
            }
            for kb in kbs {
                println!(
                    "📚 {} {}  {} files, {}",
                    kb.name.bold(),
                    format!("({})", kb.id).bright_black(),
                    kb.file_count,
                    format_bytes(kb.total_size)
                );
                if let Some(description) = kb.description.as_deref().filter(|d| !d.is_empty()) {
                    println!("   {}", description.bright_black());
                }
            }
        }
        KbCommands::Files { kb_id } => {
            select(manager, &kb_id).await?;
            print_files(manager);
        }
        KbCommands::Create { name, description } => {
            manager.create(&name, &description).await?;
            println!("{} Knowledge base \"{}\" created", "✓".bright_green(), name.trim());
        }
        KbCommands::Upload { kb_id, files, tags, yes } => {
            select(manager, &kb_id).await?;
            let files = read_files(&files).await;
            if files.is_empty() {
                bail!("No readable files to upload");
            }

            let duplicates = manager.check_duplicates(&files);
            if let Some(warning) = duplicates.warning_message() {
                println!("{}", warning.bright_yellow());
                if !yes && !confirm()? {
                    println!("{}", "Upload cancelled".bright_black());
                    return Ok(());
                }
            }

            for file in &files {
                println!("{} Uploading {}", "📤".bright_cyan(), format_selected_file(file, manager.selected_files()));
            }
            let count = manager.upload(&files, &tags).await?;
            println!("{} Successfully uploaded {} file(s)", "✓".bright_green(), count);
            print_files(manager);
        }
        KbCommands::Delete { kb_id, file_id } => {
            select(manager, &kb_id).await?;
            manager.delete_file(&file_id).await?;
            println!("{} File deleted", "🗑️".bright_green());
        }
    }
    Ok(())
}

async fn select(manager: &mut KbManager, kb_id: &str) -> Result<()> {
    manager.load().await?;
    manager.select(kb_id).await?;
    Ok(())
}

/// `name (size)`, followed by a duplicate badge when the file collides with
/// one already in the knowledge base
pub fn format_selected_file(file: &UploadFile, existing: &[KbFile]) -> String {
    let line = format!("{} ({})", file.name, format_bytes(file.size()));
    match detect_duplicate(&file.name, file.size(), existing) {
        Some(flag) => format!("{}  {}", line, flag.label().bright_yellow()),
        None => line,
    }
}

fn print_files(manager: &KbManager) {
    let Some(kb) = manager.selected() else {
        return;
    };
    println!("📚 {}", kb.name.bold());

    let files = manager.selected_files();
    if files.is_empty() {
        println!("{}", "No files uploaded yet".bright_black());
        return;
    }

    let now = Local::now();
    for file in files {
        let tags = if file.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", file.tags.join(", "))
        };
        println!(
            "{} {}  {}  {}{}  {}",
            file_icon(&file.file_name),
            file.file_name,
            format_bytes(file.file_size).bright_black(),
            format_kb_date(&file.created_at, &now).bright_black(),
            tags.bright_black(),
            file.openai_file_id.bright_black()
        );
    }
}

fn confirm() -> Result<bool> {
    print!("Upload anyway? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
