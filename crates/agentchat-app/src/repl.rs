use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use agentchat_chat::{AgentClient, SendStatus};

use crate::commands::{read_files, report, resolve_chat};
use crate::terminal_view::TerminalView;

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Help,
    NewChat,
    History,
    Switch(String),
    Delete(String),
    Rename(String, String),
    Theme,
    Thinking,
    Quick(usize),
    Upload(Vec<PathBuf>),
    Message(String),
    /// Holds the usage text to print
    Invalid(&'static str),
}

/// Parse a prompt line; `None` for blank input
pub fn parse_command(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line == "exit" || line == "quit" {
        return Some(ReplCommand::Exit);
    }
    if !line.starts_with('/') {
        return Some(ReplCommand::Message(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name {
        "/help" => ReplCommand::Help,
        "/new" => ReplCommand::NewChat,
        "/history" => ReplCommand::History,
        "/theme" => ReplCommand::Theme,
        "/thinking" => ReplCommand::Thinking,
        "/switch" if !rest.is_empty() => ReplCommand::Switch(rest.to_string()),
        "/switch" => ReplCommand::Invalid("Usage: /switch <number|id>"),
        "/delete" if !rest.is_empty() => ReplCommand::Delete(rest.to_string()),
        "/delete" => ReplCommand::Invalid("Usage: /delete <number|id>"),
        "/rename" => match rest.split_once(char::is_whitespace) {
            Some((chat, title)) if !title.trim().is_empty() => {
                ReplCommand::Rename(chat.to_string(), title.trim().to_string())
            }
            _ => ReplCommand::Invalid("Usage: /rename <number|id> <title>"),
        },
        "/q" => match rest.parse() {
            Ok(n) => ReplCommand::Quick(n),
            Err(_) => ReplCommand::Invalid("Usage: /q <number>"),
        },
        "/upload" if !rest.is_empty() => {
            ReplCommand::Upload(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "/upload" => ReplCommand::Invalid("Usage: /upload <file> [file...]"),
        // Unknown slash commands are sent as ordinary messages
        _ => ReplCommand::Message(line.to_string()),
    };
    Some(command)
}

fn print_help() {
    println!("{} Commands:", "💡".bright_yellow());
    println!("  /new                    - Start a new conversation");
    println!("  /history                - List conversations");
    println!("  /switch <number|id>     - Continue an earlier conversation");
    println!("  /rename <number|id> <title> - Rename a conversation");
    println!("  /delete <number|id>     - Delete a conversation");
    println!("  /q <number>             - Ask one of the quick questions");
    println!("  /thinking               - View thinking process of the last reply");
    println!("  /upload <file> [file..] - Upload files to the knowledge base");
    println!("  /theme                  - Toggle light/dark theme");
    println!("  exit, quit              - Leave the chat");
}

/// Run the interactive chat loop
pub async fn run_repl(client: &mut AgentClient<TerminalView>) -> Result<()> {
    let profile = client.profile();
    println!(
        "{}",
        format!("🤖 {} - terminal chat", profile.display_name).bright_cyan().bold()
    );
    println!("{}", format!("Agent: {} • {}", profile.agent_name, profile.base_url).bright_black());
    if client.is_remote_history() {
        println!("{}", "History is synced with the server".bright_black());
    } else {
        println!("{}", "History is kept locally".bright_black());
    }
    println!("{}", "Type 'exit' or 'quit' to exit, or '/help' to see commands\n".bright_black());

    client.load_theme();
    report(client.resume().await);

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline(&format!("{} ", "You:".bright_green().bold()));

        match readline {
            Ok(line) => {
                let Some(command) = parse_command(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                match command {
                    ReplCommand::Exit => {
                        println!("{}", "Goodbye!".bright_cyan());
                        break;
                    }
                    ReplCommand::Help => print_help(),
                    ReplCommand::NewChat => report(client.new_chat()),
                    ReplCommand::History => {
                        client.view_mut().request_history();
                        report(client.refresh_history().await);
                    }
                    ReplCommand::Switch(target) => {
                        if let Some(id) = find_chat(client, &target).await {
                            report(client.switch_to_chat(&id).await);
                        }
                    }
                    ReplCommand::Delete(target) => {
                        if let Some(id) = find_chat(client, &target).await {
                            match client.delete_chat(&id).await {
                                Ok(()) => println!("{} Conversation deleted", "🗑️".bright_green()),
                                Err(e) => eprintln!("{} {}", "❌".bright_red(), e),
                            }
                        }
                    }
                    ReplCommand::Rename(target, title) => {
                        if let Some(id) = find_chat(client, &target).await {
                            report(client.rename_chat(&id, &title).await);
                        }
                    }
                    ReplCommand::Theme => match client.toggle_theme() {
                        Ok(theme) => println!("{} Theme: {}", "🌓".bright_cyan(), theme),
                        Err(e) => eprintln!("{} {}", "❌".bright_red(), e),
                    },
                    ReplCommand::Thinking => print_thinking(client.view().last_thinking()),
                    ReplCommand::Quick(n) => {
                        match client.view().quick_question(n).map(str::to_string) {
                            Some(question) => send(client, &question, false).await,
                            None => eprintln!("{} No quick question {}", "❌".bright_red(), n),
                        }
                    }
                    ReplCommand::Upload(paths) => {
                        let files = read_files(&paths).await;
                        if !files.is_empty() {
                            let total = files.len();
                            let uploaded = client.upload_files(files).await;
                            println!("{} Uploaded {}/{} file(s)", "📄".bright_cyan(), uploaded, total);
                        }
                    }
                    ReplCommand::Message(text) => send(client, &text, true).await,
                    ReplCommand::Invalid(usage) => eprintln!("{} {}", "💡".bright_yellow(), usage),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".bright_red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}

async fn send(client: &mut AgentClient<TerminalView>, text: &str, typed: bool) {
    if typed {
        client.view_mut().input_already_shown();
    }
    if let SendStatus::Replied(outcome) = client.send_message(text).await {
        if outcome.skipped_frames > 0 {
            log::debug!("{} malformed frame(s) skipped", outcome.skipped_frames);
        }
    }
}

/// Resolve a history target against a fresh history list
async fn find_chat(client: &mut AgentClient<TerminalView>, target: &str) -> Option<String> {
    report(client.refresh_history().await);
    let found = resolve_chat(client.view().history(), target);
    if found.is_none() {
        eprintln!("{} No conversation '{}' (see /history)", "❌".bright_red(), target);
    }
    found
}

fn print_thinking(steps: &[String]) {
    if steps.is_empty() {
        println!("{}", "No thinking process yet".bright_black());
        return;
    }
    println!("{} View thinking process", "💭".bright_cyan());
    for step in steps {
        println!("  {} {}", "✓".bright_green(), step.bright_black());
    }
}
