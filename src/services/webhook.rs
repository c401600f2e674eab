//! HTTP seam between the flows and the remote webhooks.
//!
//! Flows talk to a [`Transport`]; [`HttpTransport`] is the reqwest-backed
//! implementation used at runtime.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, WebhookError};
use crate::model::file::SelectedFile;

const USER_AGENT: &str = "qrdocs-core/0.1.0";

/// Status line and body of a webhook answer, read fully as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_status_error(self) -> WebhookError {
        WebhookError::HttpStatus {
            status: self.status,
            status_text: self.status_text,
            body: self.body,
        }
    }
}

pub trait Transport {
    fn post_multipart(
        &self,
        url: &str,
        fields: &[(&str, String)],
        files: &[SelectedFile],
        timeout: Option<Duration>,
    ) -> Result<RawResponse>;

    fn post_json(&self, url: &str, body: &Value, timeout: Option<Duration>) -> Result<RawResponse>;

    fn get(&self, url: &str, timeout: Option<Duration>) -> Result<RawResponse>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        // Deadlines are set per request; the client itself has none.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| WebhookError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn execute(&self, req: RequestBuilder, timeout: Option<Duration>) -> Result<RawResponse> {
        let req = match timeout {
            Some(t) => req.timeout(t),
            None => req,
        };

        let resp = req.send()?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text()?;

        debug!(status = status.as_u16(), content_type = ?content_type, "response received");

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post_multipart(
        &self,
        url: &str,
        fields: &[(&str, String)],
        files: &[SelectedFile],
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key.to_string(), value.clone());
        }
        for (i, f) in files.iter().enumerate() {
            debug!(index = i + 1, name = %f.name, size = f.size, "appending file");
            let part = Part::bytes(f.content.clone())
                .file_name(f.name.clone())
                .mime_str("application/octet-stream")
                .map_err(|e| WebhookError::Network(format!("MIME parse error: {e}")))?;
            form = form.part("files", part);
        }

        debug!(url, "sending multipart request");
        self.execute(self.client.post(url).multipart(form), timeout)
    }

    fn post_json(&self, url: &str, body: &Value, timeout: Option<Duration>) -> Result<RawResponse> {
        debug!(url, "sending json request");
        self.execute(self.client.post(url).json(body), timeout)
    }

    fn get(&self, url: &str, timeout: Option<Duration>) -> Result<RawResponse> {
        self.execute(self.client.get(url), timeout)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        let mut r = RawResponse {
            status: 200,
            status_text: "OK".into(),
            content_type: None,
            body: String::new(),
        };
        assert!(r.is_success());
        r.status = 204;
        assert!(r.is_success());
        r.status = 302;
        assert!(!r.is_success());
        r.status = 500;
        assert!(!r.is_success());
    }

    #[test]
    fn status_error_keeps_raw_body() {
        let r = RawResponse {
            status: 404,
            status_text: "Not Found".into(),
            content_type: Some("text/html".into()),
            body: "<h1>nope</h1>".into(),
        };
        match r.into_status_error() {
            WebhookError::HttpStatus { status, status_text, body } => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
                assert_eq!(body, "<h1>nope</h1>");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
