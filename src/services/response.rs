//! Decoding of upload webhook answers into one of a fixed set of shapes.

use serde_json::Value;

use crate::error::{Result, WebhookError};
use crate::services::webhook::RawResponse;

pub const WORKFLOW_STARTED: &str = "Workflow was started";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResponse {
    /// QR code and share link came back in the same response.
    Completed { share_link: String, qr_code: String },
    /// The webhook accepted the job; the result goes out by email.
    Accepted,
}

/// Classify an upload answer.
///
/// Rules are checked in order and the last one always applies:
/// non-2xx status, unparsable body, `shareLink`+`qrCode`, workflow-started
/// marker, `error` field, anything else.
pub fn decode(raw: RawResponse) -> Result<UploadResponse> {
    if !raw.is_success() {
        return Err(raw.into_status_error());
    }

    let data: Value = match serde_json::from_str(&raw.body) {
        Ok(v) => v,
        Err(_) => return Err(WebhookError::MalformedBody { body: raw.body }),
    };

    if let (Some(share_link), Some(qr_code)) = (non_empty_str(&data, "shareLink"), non_empty_str(&data, "qrCode")) {
        return Ok(UploadResponse::Completed {
            share_link: share_link.to_string(),
            qr_code: qr_code.to_string(),
        });
    }

    if data.get("message").and_then(Value::as_str) == Some(WORKFLOW_STARTED) {
        return Ok(UploadResponse::Accepted);
    }

    if let Some(err) = data.get("error").filter(|e| !e.is_null()) {
        return Err(WebhookError::ServerError {
            message: error_message(err),
        });
    }

    Err(WebhookError::UnexpectedShape {
        body: data.to_string(),
    })
}

fn non_empty_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Human text for an `error` field: a plain string, `{message}`, or the JSON itself.
pub fn error_message(err: &Value) -> String {
    if let Some(s) = err.as_str() {
        return s.to_string();
    }
    if let Some(msg) = err.get("message").and_then(Value::as_str) {
        return msg.to_string();
    }
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            status_text: "OK".into(),
            content_type: Some("application/json".into()),
            body: body.into(),
        }
    }

    #[test]
    fn share_link_and_qr_code_complete() {
        let r = decode(ok(r#"{"shareLink":"L","qrCode":"Q"}"#)).unwrap();
        assert_eq!(
            r,
            UploadResponse::Completed {
                share_link: "L".into(),
                qr_code: "Q".into()
            }
        );
    }

    #[test]
    fn completed_wins_over_other_keys() {
        let r = decode(ok(
            r#"{"shareLink":"L","qrCode":"Q","message":"Workflow was started","error":"x"}"#,
        ))
        .unwrap();
        assert!(matches!(r, UploadResponse::Completed { .. }));
    }

    #[test]
    fn workflow_started_is_accepted() {
        let r = decode(ok(r#"{"message":"Workflow was started"}"#)).unwrap();
        assert_eq!(r, UploadResponse::Accepted);
    }

    #[test]
    fn other_message_is_unexpected() {
        let err = decode(ok(r#"{"message":"workflow was started"}"#)).unwrap_err();
        assert_eq!(err.kind(), "unexpected_shape");
    }

    #[test]
    fn error_string_is_server_error() {
        let err = decode(ok(r#"{"error":"boom"}"#)).unwrap_err();
        assert_eq!(err.kind(), "server_error");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn error_object_uses_its_message() {
        let err = decode(ok(r#"{"error":{"message":"quota exceeded"}}"#)).unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn null_error_is_not_a_server_error() {
        let err = decode(ok(r#"{"error":null}"#)).unwrap_err();
        assert_eq!(err.kind(), "unexpected_shape");
    }

    #[test]
    fn empty_share_link_is_not_success() {
        let err = decode(ok(r#"{"shareLink":"","qrCode":"Q"}"#)).unwrap_err();
        assert_eq!(err.kind(), "unexpected_shape");
        assert!(err.to_string().contains("qrCode"));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = decode(ok("<html>oops</html>")).unwrap_err();
        assert_eq!(err.kind(), "malformed_body");
        assert!(err.to_string().contains("<html>oops</html>"));
    }

    #[test]
    fn non_2xx_fails_even_with_success_body() {
        let mut raw = ok(r#"{"shareLink":"L","qrCode":"Q"}"#);
        raw.status = 500;
        raw.status_text = "Internal Server Error".into();
        let err = decode(raw).unwrap_err();
        assert_eq!(err.kind(), "http_status");
        assert!(err.to_string().contains("500"));
    }
}
