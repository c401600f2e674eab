use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const PREVIEW_CHARS: usize = 200;

/// One successful translation exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the Unix epoch.
    pub id: i64,
    /// Human-readable creation time, `HH:MM:SS DD/MM/YYYY` local time.
    pub timestamp: String,
    pub original: String,
    pub translated: String,
    pub full_original: String,
    pub full_translated: String,
}

impl HistoryEntry {
    pub fn new(original: &str, translated: &str) -> Self {
        Self::at(Local::now(), original, translated)
    }

    pub fn at(when: DateTime<Local>, original: &str, translated: &str) -> Self {
        Self {
            id: when.timestamp_millis(),
            timestamp: when.format("%H:%M:%S %d/%m/%Y").to_string(),
            original: preview(original),
            translated: preview(translated),
            full_original: original.to_string(),
            full_translated: translated.to_string(),
        }
    }
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when something was cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
