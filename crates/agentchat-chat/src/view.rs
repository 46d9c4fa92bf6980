use agentchat_types::Theme;

use crate::history::HistoryItem;

/// Rendering surface for a chat session.
///
/// The client calls these in lifecycle order for each message:
/// `show_user_message`, `show_thinking`, then either
/// `complete_thinking` + `begin_bot_message` + `update_bot_message`... +
/// `finalize_bot_message`, or the failure path `complete_thinking` (if still
/// open) + `discard_bot_message` + `show_error`.
pub trait ChatView {
    fn show_user_message(&mut self, text: &str);

    /// Show the thinking placeholder with one list of progress steps
    fn show_thinking(&mut self, steps: &[String]);

    /// Collapse the thinking placeholder into its "View thinking process" form
    fn complete_thinking(&mut self);

    /// Open an empty bot message that streamed text will fill
    fn begin_bot_message(&mut self);

    /// Replace the streaming bot message with the text accumulated so far
    fn update_bot_message(&mut self, full_text: &str);

    /// Re-render the streamed message once with formatting applied
    fn finalize_bot_message(&mut self, formatted: &str);

    /// Drop a partially streamed bot message
    fn discard_bot_message(&mut self);

    /// Show a complete, already formatted bot message
    fn show_bot_message(&mut self, formatted: &str);

    fn show_error(&mut self, text: &str);

    fn clear(&mut self);

    /// Show the agent's greeting and quick questions for an empty chat
    fn show_welcome(&mut self);

    fn render_history(&mut self, items: &[HistoryItem]);

    fn apply_theme(&mut self, theme: Theme);

    /// `None` hides the logo
    fn show_logo(&mut self, data_url: Option<&str>);
}
