use std::io::{self, IsTerminal, Write};

use colored::{Color, Colorize};

use agentchat_chat::{ChatView, HistoryItem, EMPTY_HISTORY_LABEL};
use agentchat_types::{AgentProfile, Theme};

use crate::render::{describe_logo, render_ansi, rows_used, terminal_width};

/// [`ChatView`] that writes to the terminal.
///
/// Streamed text is printed as it arrives and, on a tty, replaced in place by
/// the formatted reply once the stream completes.
pub struct TerminalView {
    display_name: String,
    welcome: String,
    quick_questions: Vec<String>,
    theme: Theme,
    interactive: bool,
    /// Header plus text printed for the bot message being streamed
    streamed: String,
    /// Bytes of the reply text already printed
    printed: usize,
    skip_next_echo: bool,
    last_thinking: Vec<String>,
    history: Vec<HistoryItem>,
    print_history: bool,
}

impl TerminalView {
    pub fn new(profile: &AgentProfile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            welcome: profile.welcome.clone(),
            quick_questions: profile.quick_questions.clone(),
            theme: Theme::default(),
            interactive: io::stdout().is_terminal(),
            streamed: String::new(),
            printed: 0,
            skip_next_echo: false,
            last_thinking: Vec::new(),
            history: Vec::new(),
            print_history: false,
        }
    }

    /// Steps of the most recent thinking indicator
    pub fn last_thinking(&self) -> &[String] {
        &self.last_thinking
    }

    /// History list as last rendered, for index lookups
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    /// Print the history list on the next render
    pub fn request_history(&mut self) {
        self.print_history = true;
    }

    /// The next user message is already on screen (typed at the prompt)
    pub fn input_already_shown(&mut self) {
        self.skip_next_echo = true;
    }

    pub fn quick_question(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.quick_questions.get(i))
            .map(String::as_str)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn accent(&self) -> Color {
        match self.theme {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::BrightCyan,
        }
    }

    fn bot_label(&self) -> String {
        format!("{}:", self.display_name)
            .color(self.accent())
            .bold()
            .to_string()
    }

    fn flush() {
        let _ = io::stdout().flush();
    }

    /// Erase the streamed message, leaving the cursor where it started
    fn erase_streamed(&mut self) -> bool {
        if !self.interactive || self.streamed.is_empty() {
            return false;
        }
        let rows = rows_used(&self.streamed, terminal_width());
        print!("\r");
        if rows > 1 {
            print!("\x1B[{}A", rows - 1);
        }
        print!("\x1B[J");
        Self::flush();
        true
    }
}

impl ChatView for TerminalView {
    fn show_user_message(&mut self, text: &str) {
        if !std::mem::take(&mut self.skip_next_echo) {
            println!("{} {}", "You:".bright_green().bold(), text);
        }
    }

    fn show_thinking(&mut self, steps: &[String]) {
        self.last_thinking = steps.to_vec();
        print!("🤔 Thinking...");
        Self::flush();
    }

    fn complete_thinking(&mut self) {
        print!("\r\x1B[K");
        Self::flush();
    }

    fn begin_bot_message(&mut self) {
        let label = self.bot_label();
        print!("{} ", label);
        Self::flush();
        self.streamed = format!("{}: ", self.display_name);
        self.printed = 0;
    }

    fn update_bot_message(&mut self, full_text: &str) {
        if let Some(delta) = full_text.get(self.printed..) {
            print!("{}", delta);
            self.streamed.push_str(delta);
            self.printed = full_text.len();
            Self::flush();
        }
    }

    fn finalize_bot_message(&mut self, formatted: &str) {
        if self.erase_streamed() {
            println!("{} {}", self.bot_label(), render_ansi(formatted, self.accent()));
        } else {
            println!();
        }
        println!();
        self.streamed.clear();
    }

    fn discard_bot_message(&mut self) {
        if !self.erase_streamed() && !self.streamed.is_empty() {
            println!();
        }
        self.streamed.clear();
    }

    fn show_bot_message(&mut self, formatted: &str) {
        println!("{} {}\n", self.bot_label(), render_ansi(formatted, self.accent()));
    }

    fn show_error(&mut self, text: &str) {
        eprintln!("{} {}\n", "❌".bright_red(), text.bright_red());
    }

    fn clear(&mut self) {
        self.streamed.clear();
        println!("{}", "─".repeat(60).bright_black());
    }

    fn show_welcome(&mut self) {
        println!("{} {}", "🤖".bright_cyan(), self.display_name.color(self.accent()).bold());
        println!("{}", self.welcome);
        if !self.quick_questions.is_empty() {
            println!("{}", "Quick questions (type /q <number>):".bright_black());
            for (i, question) in self.quick_questions.iter().enumerate() {
                println!("  {} {}", format!("{}.", i + 1).bright_black(), question);
            }
        }
        println!();
    }

    fn render_history(&mut self, items: &[HistoryItem]) {
        self.history = items.to_vec();
        if !std::mem::take(&mut self.print_history) {
            return;
        }

        if items.is_empty() {
            println!("{}", EMPTY_HISTORY_LABEL.bright_black());
            return;
        }
        for (i, item) in items.iter().enumerate() {
            let marker = if item.active { "▶" } else { " " };
            let line = format!(
                "{} {:>2}. {}  {}",
                marker,
                i + 1,
                item.title,
                item.date_label.bright_black()
            );
            if item.active {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn show_logo(&mut self, data_url: Option<&str>) {
        match data_url.and_then(describe_logo) {
            Some(summary) => println!("{} Client logo: {}", "🖼️".bright_cyan(), summary),
            None if data_url.is_some() => println!("{} Client logo set", "🖼️".bright_cyan()),
            None => println!("{}", "No client logo".bright_black()),
        }
    }
}
