use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use agentchat_types::TITLE_MAX_CHARS;

struct Patterns {
    bold: Regex,
    h3: Regex,
    h2: Regex,
    bullet: Regex,
    numbered: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                bold: Regex::new(r"\*\*(.+?)\*\*").ok()?,
                h3: Regex::new(r"(?m)^### (.+)$").ok()?,
                h2: Regex::new(r"(?m)^## (.+)$").ok()?,
                bullet: Regex::new(r"^\s*[-•]\s+(.+)$").ok()?,
                numbered: Regex::new(r"(?m)^(\d+)\.\s+(.+)$").ok()?,
            })
        })
        .as_ref()
}

/// Render the markdown subset bot replies use into HTML fragments.
///
/// Supported: `**bold**`, `##`/`###` headers, runs of `-`/`•` bullets and
/// `N. item` lines. Everything else passes through untouched.
pub fn format_message(text: &str) -> String {
    let Some(p) = patterns() else {
        return text.to_string();
    };

    let text = p.bold.replace_all(text, "<strong>$1</strong>");
    let text = p.h3.replace_all(&text, "<h3>$1</h3>");
    let text = p.h2.replace_all(&text, "<h2>$1</h2>");

    let mut lines = Vec::new();
    let mut in_list = false;
    for line in text.split('\n') {
        match p.bullet.captures(line) {
            Some(caps) => {
                if !in_list {
                    lines.push("<ul>".to_string());
                    in_list = true;
                }
                lines.push(format!("<li>{}</li>", &caps[1]));
            }
            None => {
                if in_list {
                    lines.push("</ul>".to_string());
                    in_list = false;
                }
                lines.push(line.to_string());
            }
        }
    }
    if in_list {
        lines.push("</ul>".to_string());
    }

    p.numbered
        .replace_all(
            &lines.join("\n"),
            r#"<div class="numbered-item"><span class="number">$1.</span><span>$2</span></div>"#,
        )
        .into_owned()
}

/// Title derived from the first user message of a chat
pub fn auto_title(message: &str) -> String {
    if message.chars().count() > TITLE_MAX_CHARS {
        format!("{}...", message.chars().take(TITLE_MAX_CHARS).collect::<String>())
    } else {
        message.to_string()
    }
}

/// Relative age of an ISO timestamp for the history list.
///
/// Unparseable timestamps are shown as given.
pub fn format_relative_date(iso: &str, now: DateTime<Utc>) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(iso) else {
        return iso.to_string();
    };
    let date = date.with_timezone(&Utc);
    let diff = now.signed_duration_since(date);

    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        date.format("%-m/%-d/%Y").to_string()
    }
}
