//! Error taxonomy for the webhook client.
//!
//! Every variant renders as the message the front-end shows, in Vietnamese.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("{0}")]
    Validation(String),

    #[error("Đang xử lý yêu cầu trước đó, vui lòng đợi.")]
    Busy,

    #[error(
        "Không thể kết nối đến server. Vui lòng kiểm tra:\n• Kết nối internet\n• URL webhook có đúng không\n• Server n8n có đang chạy không\n({0})"
    )]
    Network(String),

    #[error("Xử lý mất quá nhiều thời gian. Vui lòng thử lại sau.")]
    Timeout,

    #[error("Lỗi HTTP: {status} - {status_text}\nChi tiết: {body}")]
    HttpStatus {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Phản hồi không phải JSON hợp lệ: {body}")]
    MalformedBody { body: String },

    #[error("Phản hồi thiếu dữ liệu: {body}")]
    UnexpectedShape { body: String },

    #[error("{message}")]
    ServerError { message: String },

    #[error("Lỗi đọc file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lỗi lưu lịch sử: {0}")]
    Storage(String),
}

impl WebhookError {
    /// Stable identifier sent to the front-end next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::Validation(_) => "validation",
            WebhookError::Busy => "busy",
            WebhookError::Network(_) => "network",
            WebhookError::Timeout => "timeout",
            WebhookError::HttpStatus { .. } => "http_status",
            WebhookError::MalformedBody { .. } => "malformed_body",
            WebhookError::UnexpectedShape { .. } => "unexpected_shape",
            WebhookError::ServerError { .. } => "server_error",
            WebhookError::Io(_) => "io",
            WebhookError::Storage(_) => "storage",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        WebhookError::Validation(message.into())
    }
}

impl From<reqwest::Error> for WebhookError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebhookError::Timeout
        } else {
            WebhookError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, WebhookError>;
