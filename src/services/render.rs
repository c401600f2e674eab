use serde::Serialize;

use crate::config::Config;
use crate::error::WebhookError;
use crate::model::history::HistoryEntry;

/// Instruction telling the front-end what to show after a command.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Render {
    /// Controls only; nothing beyond the state snapshot changed.
    Form,
    Files {
        added: usize,
        skipped_duplicates: usize,
        warnings: Vec<String>,
    },
    QrResult {
        share_link: String,
        qr_image: String,
        qr_path: Option<String>,
        scroll_into_view: bool,
    },
    Pending {
        email: String,
        message: String,
    },
    Translation {
        text: String,
        html: String,
    },
    History {
        entries: Vec<HistoryEntry>,
    },
    Notice {
        message: String,
    },
    Config {
        config: Config,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl Render {
    pub fn qr_result(share_link: String, qr_code: &str, qr_path: Option<String>) -> Self {
        Render::QrResult {
            share_link,
            qr_image: format!("data:image/png;base64,{qr_code}"),
            qr_path,
            scroll_into_view: true,
        }
    }

    pub fn pending(email: &str) -> Self {
        Render::Pending {
            email: email.to_string(),
            message: format!(
                "Yêu cầu đang được xử lý ở chế độ nền. Kết quả sẽ được gửi tới {email}."
            ),
        }
    }

    pub fn translation(text: String) -> Self {
        let html = escape_html(&text);
        Render::Translation { text, html }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Render::Notice {
            message: message.into(),
        }
    }

    /// Failure view; `context` is prepended to the error text.
    pub fn error(context: &str, err: &WebhookError) -> Self {
        let message = match err {
            WebhookError::Validation(_) | WebhookError::Busy => err.to_string(),
            _ => format!("{context}{err}"),
        };
        Render::Error {
            kind: err.kind().to_string(),
            message,
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
