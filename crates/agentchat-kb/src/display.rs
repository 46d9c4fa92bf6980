use chrono::{DateTime, TimeZone};

const BYTE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base-1024 units with at most two decimals
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    while exponent < BYTE_UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{} {}", rounded, BYTE_UNITS[exponent])
}

/// Emoji for a file, by extension
pub fn file_icon(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match ext.as_str() {
        "pdf" => "📄",
        "doc" | "docx" => "📝",
        "txt" => "📃",
        "csv" | "xlsx" | "xls" => "📊",
        "json" => "📋",
        _ => "📎",
    }
}

/// Calendar-day age of an upload: `Today`, `Yesterday`, `N days ago`, or a
/// date like `Mar 5, 2024`. Days are counted in `now`'s timezone.
pub fn format_kb_date<Tz: TimeZone>(iso: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Ok(date) = DateTime::parse_from_rfc3339(iso) else {
        return iso.to_string();
    };
    let date = date.with_timezone(&now.timezone());
    let days = (now.date_naive() - date.date_naive()).num_days();

    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{} days ago", d),
        _ => date.format("%b %-d, %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_263_616), "1.21 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_gigabytes() {
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_file_icons() {
        assert_eq!(file_icon("report.PDF"), "📄");
        assert_eq!(file_icon("notes.docx"), "📝");
        assert_eq!(file_icon("data.xls"), "📊");
        assert_eq!(file_icon("config.json"), "📋");
        assert_eq!(file_icon("archive.tar.gz"), "📎");
        assert_eq!(file_icon("README"), "📎");
    }

    #[test]
    fn test_kb_dates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap();
        assert_eq!(format_kb_date("2024-03-20T01:00:00.000Z", &now), "Today");
        assert_eq!(format_kb_date("2024-03-19T23:59:00.000Z", &now), "Yesterday");
        assert_eq!(format_kb_date("2024-03-16T12:00:00.000Z", &now), "4 days ago");
        assert_eq!(format_kb_date("2024-03-05T12:00:00.000Z", &now), "Mar 5, 2024");
        assert_eq!(format_kb_date("garbage", &now), "garbage");
    }
}
