//! Commit message templating
//!
//! Placeholders:
//! - `{iso}`    RFC 3339 UTC timestamp
//! - `{unix}`   Unix seconds
//! - `{branch}` configured or current branch
//! - `{file}`   base name of the first changed path
//! - `{count}`  number of changed paths

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::Path;

const FALLBACK: &str = "autosave";

pub fn render_message(template: &str, files: &[String], branch: &str, now: DateTime<Utc>) -> String {
    let file = files
        .first()
        .and_then(|f| Path::new(f).file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let msg = template
        .replace("{iso}", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace("{unix}", &now.timestamp().to_string())
        .replace("{branch}", branch)
        .replace("{file}", &file)
        .replace("{count}", &files.len().to_string());

    if msg.trim().is_empty() {
        FALLBACK.to_string()
    } else {
        msg
    }
}

/// Append `Key: value` trailers (already key-ordered) after a blank line
pub fn with_trailers(message: String, trailers: &BTreeMap<String, String>) -> String {
    if trailers.is_empty() {
        return message;
    }
    let lines: Vec<String> = trailers.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{message}\n\n{}", lines.join("\n"))
}
