use std::cell::Cell;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, WebhookError};
use crate::model::history::HistoryEntry;
use crate::model::session::InFlight;
use crate::services::history::History;
use crate::services::response::error_message;
use crate::services::validate;
use crate::services::webhook::Transport;

/// Keys that may carry the translated text, most preferred first.
pub const RESULT_KEYS: [&str; 6] = ["text", "translatedText", "result", "output", "message", "content"];

/// Translate `text` through the webhook and record the exchange in history.
///
/// A history write failure is logged; the translation is still returned.
pub fn submit(
    in_flight: &Cell<bool>,
    text: &str,
    transport: &dyn Transport,
    cfg: &Config,
    history: &mut History,
) -> Result<String> {
    let _in_flight = InFlight::acquire(in_flight)?;

    validate::chinese_text(text)?;
    let text = text.trim();

    debug!(chars = text.chars().count(), url = %cfg.translate_url, "submitting translation");
    let raw = transport.post_json(&cfg.translate_url, &json!({ "text": text }), cfg.translate_timeout)?;

    if !raw.is_success() {
        return Err(raw.into_status_error());
    }

    let translated = extract_translation(&raw.body)?;
    info!(chars = translated.chars().count(), "translation received");

    if let Err(e) = history.push(HistoryEntry::new(text, &translated)) {
        warn!(error = %e, "failed to record translation in history");
    }

    Ok(translated)
}

/// Pull the translated text out of a 2xx response body.
pub fn extract_translation(body: &str) -> Result<String> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return non_empty(body.trim().to_string(), body),
    };

    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        return Err(WebhookError::ServerError {
            message: error_message(err),
        });
    }

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(WebhookError::ServerError {
            message: "Dịch thất bại, máy chủ không trả về kết quả.".to_string(),
        });
    }

    let text = match &value {
        Value::String(s) => s.clone(),
        Value::Object(map) => preferred(map)
            .or_else(|| flatten(&value))
            .unwrap_or_else(|| value.to_string()),
        Value::Array(_) => flatten(&value).unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    };

    non_empty(text, body)
}

fn non_empty(text: String, body: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Err(WebhookError::UnexpectedShape {
            body: body.to_string(),
        });
    }
    Ok(text)
}

fn preferred(map: &Map<String, Value>) -> Option<String> {
    RESULT_KEYS
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str).filter(|s| !s.trim().is_empty()))
        .map(str::to_string)
}

/// Every non-empty string leaf, depth first, joined by newlines.
fn flatten(value: &Value) -> Option<String> {
    let mut leaves = Vec::new();
    collect_strings(value, &mut leaves);
    if leaves.is_empty() {
        None
    } else {
        Some(leaves.join("\n"))
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) if !s.trim().is_empty() => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
