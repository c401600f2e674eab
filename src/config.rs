//! Runtime configuration read from environment variables.
//!
//! Every value has a hardcoded fallback so the core starts with no environment
//! at all.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_UPLOAD_URL: &str = "https://n8n.myaloha.vn/webhook/upload-docs";
pub const DEFAULT_TRANSLATE_URL: &str = "https://n8n.myaloha.vn/webhook/translate";
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HISTORY_FILE: &str = "translation_history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub upload_url: String,
    pub translate_url: String,
    /// Deadline for the upload request.
    pub upload_timeout: Option<Duration>,
    /// `None` leaves the request without a client-side deadline.
    pub translate_timeout: Option<Duration>,
    pub history_file: PathBuf,
    pub qr_output_dir: Option<PathBuf>,
    /// Adds `user` and `timestamp` fields to the upload form when set.
    pub user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            upload_timeout: Some(Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS)),
            translate_timeout: None,
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            qr_output_dir: None,
            user: None,
        }
    }
}

impl Config {
    /// Build config from environment variables.
    ///
    /// - `WEBHOOK_URL`: upload endpoint
    /// - `TRANSLATE_WEBHOOK_URL`: translation endpoint
    /// - `UPLOAD_TIMEOUT_SECS`: default 120, `0` disables the deadline
    /// - `TRANSLATE_TIMEOUT_SECS`: unset means no deadline
    /// - `HISTORY_FILE`: default `translation_history.json`
    /// - `QR_OUTPUT_DIR`: where decoded QR images are written, optional
    /// - `WEBHOOK_USER`: metadata user, optional
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let upload_timeout = match non_empty("UPLOAD_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.upload_timeout,
        };
        let translate_timeout = non_empty("TRANSLATE_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            upload_url: non_empty("WEBHOOK_URL").unwrap_or(defaults.upload_url),
            translate_url: non_empty("TRANSLATE_WEBHOOK_URL").unwrap_or(defaults.translate_url),
            upload_timeout,
            translate_timeout,
            history_file: non_empty("HISTORY_FILE").map(PathBuf::from).unwrap_or(defaults.history_file),
            qr_output_dir: non_empty("QR_OUTPUT_DIR").map(PathBuf::from),
            user: non_empty("WEBHOOK_USER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_fallbacks() {
        let cfg = Config::from_lookup(lookup(&[]));
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.upload_timeout, Some(Duration::from_secs(120)));
        assert_eq!(cfg.translate_timeout, None);
    }

    #[test]
    fn environment_overrides_urls_and_timeouts() {
        let cfg = Config::from_lookup(lookup(&[
            ("WEBHOOK_URL", "http://localhost:5678/webhook/upload"),
            ("TRANSLATE_WEBHOOK_URL", "http://localhost:5678/webhook/tr"),
            ("UPLOAD_TIMEOUT_SECS", "30"),
            ("TRANSLATE_TIMEOUT_SECS", "15"),
            ("WEBHOOK_USER", "KwokPacific"),
        ]));
        assert_eq!(cfg.upload_url, "http://localhost:5678/webhook/upload");
        assert_eq!(cfg.translate_url, "http://localhost:5678/webhook/tr");
        assert_eq!(cfg.upload_timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.translate_timeout, Some(Duration::from_secs(15)));
        assert_eq!(cfg.user.as_deref(), Some("KwokPacific"));
    }

    #[test]
    fn blank_or_invalid_values_fall_back() {
        let cfg = Config::from_lookup(lookup(&[
            ("WEBHOOK_URL", "   "),
            ("UPLOAD_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(cfg.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(cfg.upload_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn zero_upload_timeout_disables_deadline() {
        let cfg = Config::from_lookup(lookup(&[("UPLOAD_TIMEOUT_SECS", "0")]));
        assert_eq!(cfg.upload_timeout, None);
    }
}
