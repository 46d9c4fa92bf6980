// Terminal rendering of formatted bot replies
use std::sync::OnceLock;

use colored::{Color, Colorize};
use regex::{Captures, Regex};
use unicode_width::UnicodeWidthStr;

struct Tags {
    heading: Regex,
    item: Regex,
    numbered: Regex,
    strong: Regex,
}

fn tags() -> Option<&'static Tags> {
    static TAGS: OnceLock<Option<Tags>> = OnceLock::new();
    TAGS.get_or_init(|| {
        Some(Tags {
            heading: Regex::new(r"^<h[23]>(.*)</h[23]>$").ok()?,
            item: Regex::new(r"^<li>(.*)</li>$").ok()?,
            numbered: Regex::new(
                r#"<div class="numbered-item"><span class="number">(\d+)\.</span><span>(.*?)</span></div>"#,
            )
            .ok()?,
            strong: Regex::new(r"<strong>(.*?)</strong>").ok()?,
        })
    })
    .as_ref()
}

/// Turn the HTML fragments produced by `format_message` into styled
/// terminal text. Headers take the accent color.
pub fn render_ansi(formatted: &str, accent: Color) -> String {
    let Some(t) = tags() else {
        return formatted.to_string();
    };

    let mut out = Vec::new();
    for line in formatted.split('\n') {
        if line == "<ul>" || line == "</ul>" {
            continue;
        }

        let line = t.numbered.replace_all(line, "  $1. $2");
        let line = t.strong.replace_all(&line, |caps: &Captures| caps[1].bold().to_string());

        let rendered = if let Some(caps) = t.heading.captures(&line) {
            caps[1].color(accent).bold().to_string()
        } else if let Some(caps) = t.item.captures(&line) {
            format!("  • {}", &caps[1])
        } else {
            line.into_owned()
        };
        out.push(rendered);
    }
    out.join("\n")
}

/// Number of terminal rows `text` occupies at `width` columns.
/// Wide characters (CJK, most emoji) take two columns.
pub fn rows_used(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.split('\n')
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

/// Terminal width from `COLUMNS`, 80 when unknown
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .filter(|w: &usize| *w > 0)
        .unwrap_or(80)
}

/// One-line summary of a stored logo data URL, e.g. `image/png, 12 KB`
pub fn describe_logo(data_url: &str) -> Option<String> {
    let rest = data_url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let padding = payload.chars().rev().take_while(|c| *c == '=').count() as u64;
    let bytes = (payload.len() as u64 * 3 / 4).saturating_sub(padding);
    Some(format!("{}, {}", mime, agentchat_kb::format_bytes(bytes)))
}
