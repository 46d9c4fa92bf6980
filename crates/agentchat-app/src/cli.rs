use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// CLI arguments for agentchat
#[derive(Parser, Debug)]
#[command(name = "agentchat")]
#[command(about = "Agentchat - terminal chat client for branded assistants")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Built-in agent profile to use (freeda, aspect)
    #[arg(long, short = 'p', default_value = "freeda", env = "AGENTCHAT_PROFILE")]
    pub profile: String,

    /// TOML file describing a custom agent profile (overrides --profile)
    #[arg(long, value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Agent server URL (e.g., http://localhost:3000)
    #[arg(long, value_name = "URL", env = "AGENTCHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory holding the local store (default: ~/.agentchat)
    #[arg(long, value_name = "DIR", env = "AGENTCHAT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Ask the agent to consult its knowledge base
    #[arg(long, conflicts_with = "no_kb")]
    pub use_kb: bool,

    /// Do not consult the knowledge base, even if the profile does
    #[arg(long)]
    pub no_kb: bool,

    /// Enable verbose debug output (shows HTTP requests, responses and stream frames)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub generate: Option<Shell>,
}

impl Cli {
    /// Knowledge-base override from the command line, if any
    pub fn knowledge_base_override(&self) -> Option<bool> {
        match (self.use_kb, self.no_kb) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the agent (default)
    Chat {
        /// Send a single message and exit instead of starting the REPL
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Start a new conversation
    NewChat,
    /// Browse and manage conversation history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show or switch the color theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Manage the client logo
    Logo {
        #[command(subcommand)]
        command: LogoCommands,
    },
    /// Upload files to the agent's knowledge base from the chat
    Upload {
        /// Files to upload, one at a time
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Manage knowledge bases
    Kb {
        #[command(subcommand)]
        command: KbCommands,
    },
}

/// Conversations are addressed by id or by their 1-based position in `history list`
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List conversations, newest first
    List,
    /// Print the messages of a conversation
    Show { chat: String },
    /// Rename a conversation
    Rename { chat: String, title: String },
    /// Delete a conversation
    Delete { chat: String },
    /// Make a conversation the current one
    Switch { chat: String },
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    Show,
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum LogoCommands {
    /// Store an image file (max 2 MB) as the client logo
    Set { path: PathBuf },
    Remove,
    Show,
}

#[derive(Subcommand, Debug)]
pub enum KbCommands {
    /// List the agent's knowledge bases
    List,
    /// List the files of a knowledge base
    Files { kb_id: String },
    /// Create a knowledge base
    Create {
        name: String,
        #[arg(short = 'd', long, default_value = "")]
        description: String,
    },
    /// Upload files to a knowledge base
    Upload {
        kb_id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Comma-separated tags (e.g., "finance, q3, 2024")
        #[arg(short = 't', long, default_value = "")]
        tags: String,
        /// Upload even when duplicates are detected
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete a file from a knowledge base
    Delete { kb_id: String, file_id: String },
}
