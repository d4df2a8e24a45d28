//! Output renderers and formatting helpers for CLI commands.

use std::io::{self, IsTerminal};

use anyhow::anyhow;
use fetchctl_api_models::{TorrentListResponse, TorrentRecord};
use fetchctl_panel::{RenderPhase, RenderedTorrent, format_eta, format_speed};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const HASH_WIDTH: usize = 12;
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_KEY: &str = "\x1b[36m";
const ANSI_STRING: &str = "\x1b[32m";
const ANSI_NUMBER: &str = "\x1b[33m";
const ANSI_BOOL: &str = "\x1b[35m";
const ANSI_NULL: &str = "\x1b[90m";

/// Pretty-print any serialisable value, highlighted when stdout is a terminal.
pub(crate) fn render_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    if io::stdout().is_terminal() {
        println!("{}", highlight_json(&text));
    } else {
        println!("{text}");
    }
    Ok(())
}

pub(crate) fn render_torrent_list(
    list: &TorrentListResponse,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => render_json(list)?,
        OutputFormat::Table => {
            println!("{}", table_header());
            for record in &list.items {
                println!("{}", table_row(record));
            }
            if list.items.is_empty() {
                println!("(no torrents)");
            }
        }
    }
    Ok(())
}

pub(crate) fn table_header() -> String {
    format!(
        "{:<12} {:<11} {:>6} {:>10} {:>10} {:>7} {:>8} NAME",
        "HASH", "STATUS", "PROG", "DOWN", "UP", "PEERS", "ETA"
    )
}

/// One table line; transfer columns are blank unless the torrent is downloading.
pub(crate) fn table_row(record: &TorrentRecord) -> String {
    let hash: String = record.hash.chars().take(HASH_WIDTH).collect();
    let progress = format!("{:.1}%", record.progress());
    let (down, up, peers, eta) = if record.is_downloading() {
        (
            format_speed(record.speed_download_mbps),
            format_speed(record.speed_upload_mbps),
            format!("{}/{}", record.seeders, record.leechers),
            format_eta(record.eta()),
        )
    } else {
        let dash = || "-".to_string();
        (dash(), dash(), dash(), dash())
    };

    let mut line = format!(
        "{:<12} {:<11} {:>6} {:>10} {:>10} {:>7} {:>8} {}",
        hash,
        record.status.as_str(),
        progress,
        down,
        up,
        peers,
        eta,
        record.name
    );
    let mut notes = Vec::new();
    if let Some(subs) = record.subtitle_status() {
        notes.push(format!("subs:{}", subs.as_str()));
    }
    if let Some(rename) = record.rename_status() {
        notes.push(format!("rename:{}", rename.as_str()));
    }
    let tags = record.display_tags();
    if !tags.is_empty() {
        notes.push(format!("tags:{}", tags.join(",")));
    }
    if !notes.is_empty() {
        line.push_str("  [");
        line.push_str(&notes.join(" "));
        line.push(']');
    }
    line
}

/// Marker column used by `watch`.
pub(crate) const fn phase_marker(phase: RenderPhase) -> char {
    match phase {
        RenderPhase::Entering => '+',
        RenderPhase::Exiting => '-',
        RenderPhase::Steady => ' ',
    }
}

pub(crate) fn watch_row(row: &RenderedTorrent) -> String {
    format!("{} {}", phase_marker(row.phase), table_row(&row.record))
}

/// Keys and strings, booleans, null, then numbers. A string followed by `:`
/// captures the colon in group 2 and is painted as a key.
const JSON_TOKEN_PATTERN: &str = r#"("(?:\\u[a-zA-Z0-9]{4}|\\[^u]|[^\\"])*")(\s*:)?|\b(true|false)\b|\bnull\b|-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?"#;

static JSON_TOKEN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(JSON_TOKEN_PATTERN).ok());

/// Colour a pretty-printed JSON document with ANSI escapes.
pub(crate) fn highlight_json(text: &str) -> String {
    let Some(tokens) = JSON_TOKEN.as_ref() else {
        return text.to_string();
    };
    tokens
        .replace_all(text, |caps: &Captures<'_>| {
            if let Some(string) = caps.get(1) {
                return caps.get(2).map_or_else(
                    || paint(ANSI_STRING, string.as_str()),
                    |colon| format!("{}{}", paint(ANSI_KEY, string.as_str()), colon.as_str()),
                );
            }
            let token = &caps[0];
            if caps.get(3).is_some() {
                paint(ANSI_BOOL, token)
            } else if token == "null" {
                paint(ANSI_NULL, token)
            } else {
                paint(ANSI_NUMBER, token)
            }
        })
        .into_owned()
}

fn paint(colour: &str, token: &str) -> String {
    format!("{colour}{token}{ANSI_RESET}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchctl_api_models::TorrentStatus;
    use serde_json::json;

    fn downloading() -> TorrentRecord {
        TorrentRecord {
            status: TorrentStatus::Downloading,
            progress_percentage: 42.25,
            speed_download_mbps: 3.5,
            speed_upload_mbps: 0.25,
            seeders: 12,
            leechers: 3,
            eta_minutes: Some(75.0),
            tags: vec![
                "fetch-api".to_string(),
                "jellyfin:find_subs=pending".to_string(),
            ],
            ..TorrentRecord::new("0123456789abcdef0123", "Movie (2024)")
        }
    }

    #[test]
    fn downloading_rows_show_transfer_columns() {
        let row = table_row(&downloading());
        assert!(row.starts_with("0123456789ab "));
        assert!(row.contains("downloading"));
        assert!(row.contains("42.2%") || row.contains("42.3%"));
        assert!(row.contains("3.5 MB/s"));
        assert!(row.contains("256 KB/s"));
        assert!(row.contains("12/3"));
        assert!(row.contains("1h 15m"));
        assert!(row.contains("Movie (2024)"));
        assert!(row.ends_with("[subs:pending tags:fetch-api]"));
    }

    #[test]
    fn idle_rows_blank_transfer_columns() {
        let record = TorrentRecord {
            status: TorrentStatus::Completed,
            progress_percentage: 100.0,
            speed_download_mbps: 9.0,
            ..TorrentRecord::new("abc", "Done")
        };
        let row = table_row(&record);
        assert!(row.contains("completed"));
        assert!(row.contains("100.0%"));
        assert!(!row.contains("MB/s"));
        assert!(row.ends_with("Done"));
    }

    #[test]
    fn markers_follow_phases() {
        assert_eq!(phase_marker(RenderPhase::Entering), '+');
        assert_eq!(phase_marker(RenderPhase::Exiting), '-');
        assert_eq!(phase_marker(RenderPhase::Steady), ' ');

        let row = RenderedTorrent {
            record: TorrentRecord::new("abc", "Movie"),
            phase: RenderPhase::Exiting,
        };
        assert!(watch_row(&row).starts_with("- abc"));
    }

    #[test]
    fn highlight_colours_each_token_kind() {
        let text = serde_json::to_string_pretty(&json!({
            "name": "Movie: \"cut\"",
            "progress": -1.5e3,
            "done": false,
            "eta": null
        }))
        .expect("pretty");
        let coloured = highlight_json(&text);

        assert!(coloured.contains(&format!("{ANSI_KEY}\"name\"{ANSI_RESET}")));
        assert!(coloured.contains(&format!("{ANSI_STRING}\"Movie: \\\"cut\\\"\"{ANSI_RESET}")));
        assert!(coloured.contains(&format!("{ANSI_NUMBER}-1500.0{ANSI_RESET}")));
        assert!(coloured.contains(&format!("{ANSI_BOOL}false{ANSI_RESET}")));
        assert!(coloured.contains(&format!("{ANSI_NULL}null{ANSI_RESET}")));
    }

    #[test]
    fn highlight_handles_escapes_and_numeric_text() {
        assert!(JSON_TOKEN.is_some());
        let text = serde_json::to_string_pretty(&json!({
            "path\\to": "C:\\data\\",
            "tag": "x2-9",
            "eta": 1e-3
        }))
        .expect("pretty");
        let coloured = highlight_json(&text);

        assert!(coloured.contains(&format!("{ANSI_KEY}\"path\\\\to\"{ANSI_RESET}:")));
        assert!(coloured.contains(&format!("{ANSI_STRING}\"C:\\\\data\\\\\"{ANSI_RESET}")));
        assert!(coloured.contains(&format!("{ANSI_STRING}\"x2-9\"{ANSI_RESET}")));
        assert!(coloured.contains(&format!("{ANSI_NUMBER}0.001{ANSI_RESET}")));
    }

    #[test]
    fn highlight_preserves_text_when_stripped() {
        let text = serde_json::to_string_pretty(&json!({"items": [1, true, "x"]})).expect("pretty");
        let stripped = highlight_json(&text)
            .replace(ANSI_KEY, "")
            .replace(ANSI_STRING, "")
            .replace(ANSI_NUMBER, "")
            .replace(ANSI_BOOL, "")
            .replace(ANSI_NULL, "")
            .replace(ANSI_RESET, "");
        assert_eq!(stripped, text);
    }
}
