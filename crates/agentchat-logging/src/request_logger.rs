use colored::Colorize;

use crate::safe_truncate;

const MAX_BODY_CHARS: usize = 5000;

/// Log HTTP request details for debugging (stderr, verbose mode only)
pub fn log_request(method: &str, url: &str, body: Option<&serde_json::Value>, verbose: bool) {
    if !verbose {
        return;
    }

    eprintln!("\n{}", "═".repeat(80).bright_cyan());
    eprintln!("{}", "🔍 HTTP REQUEST DEBUG".bright_cyan().bold());
    eprintln!("{}", "═".repeat(80).bright_cyan());

    eprintln!("{}: {}", "Method".bright_yellow(), method);

    // Parse URL to show host and port
    if let Ok(parsed_url) = reqwest::Url::parse(url) {
        eprintln!("{}: {}", "URL".bright_yellow(), url);
        eprintln!("{}: {}", "Host".bright_yellow(), parsed_url.host_str().unwrap_or("unknown"));
        eprintln!(
            "{}: {}",
            "Port".bright_yellow(),
            parsed_url.port().map(|p| p.to_string()).unwrap_or_else(|| {
                if parsed_url.scheme() == "https" {
                    "443 (default)".to_string()
                } else {
                    "80 (default)".to_string()
                }
            })
        );
    } else {
        eprintln!("{}: {}", "URL".bright_yellow(), url);
    }

    if let Some(body) = body {
        eprintln!("\n{}", "Request Body:".bright_yellow());
        match serde_json::to_string_pretty(body) {
            Ok(json) => print_truncated(&json),
            Err(e) => eprintln!("{}", format!("Error serializing request: {}", e).red()),
        }
    }

    eprintln!("{}", "═".repeat(80).bright_cyan());
    eprintln!();
}

/// Log HTTP response status and body for debugging (stderr, verbose mode only).
/// Streaming responses pass `None` for the body; their frames go through
/// [`log_stream_chunk`].
pub fn log_response(status: reqwest::StatusCode, url: &str, body: Option<&str>, verbose: bool) {
    if !verbose {
        return;
    }

    let banner = if status.is_success() {
        "═".repeat(80).bright_green()
    } else {
        "═".repeat(80).bright_red()
    };

    eprintln!("\n{}", banner);
    eprintln!("{}", "📥 HTTP RESPONSE DEBUG".bright_green().bold());
    eprintln!(
        "{}: {} {}",
        "Status".bright_yellow(),
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    eprintln!("{}: {}", "URL".bright_yellow(), url);

    if let Some(body) = body {
        eprintln!("\n{}", "Response Body:".bright_yellow());
        // Try to pretty-print JSON, fall back to raw text
        match serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok())
        {
            Some(pretty) => print_truncated(&pretty),
            None => print_truncated(body),
        }
    }

    eprintln!("{}", banner);
}

/// Log a single SSE data payload (verbose mode only)
pub fn log_stream_chunk(chunk_num: usize, data: &str, verbose: bool) {
    if !verbose {
        return;
    }

    eprintln!(
        "{}",
        format!(
            "📦 Stream Chunk #{}: {}",
            chunk_num,
            if data.chars().count() > 200 {
                format!("{}... ({} bytes)", safe_truncate(data, 200), data.len())
            } else {
                data.to_string()
            }
        )
        .bright_black()
    );
}

fn print_truncated(text: &str) {
    if text.chars().count() > MAX_BODY_CHARS {
        eprintln!("{}", safe_truncate(text, MAX_BODY_CHARS));
        eprintln!(
            "\n{}",
            format!("... (truncated, total {} bytes)", text.len()).bright_black()
        );
    } else {
        eprintln!("{}", text);
    }
}
