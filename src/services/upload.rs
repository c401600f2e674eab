use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, WebhookError};
use crate::model::session::{InFlight, UploadForm};
use crate::services::response::{self, UploadResponse};
use crate::services::validate;
use crate::services::webhook::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed {
        share_link: String,
        qr_code: String,
        qr_path: Option<PathBuf>,
    },
    /// Work continues on the server; the result is mailed to `email`.
    Accepted { email: String },
}

/// Send the selected files to the upload webhook and interpret the answer.
///
/// Nothing is sent when a request is already in flight or the form is
/// invalid. The selection is cleared only on a completed result.
pub fn submit(form: &mut UploadForm, transport: &dyn Transport, cfg: &Config) -> Result<UploadOutcome> {
    let _in_flight = InFlight::acquire(&form.in_flight)?;

    if form.files.is_empty() {
        return Err(WebhookError::validation(
            "Vui lòng chọn ít nhất một file để upload.",
        ));
    }
    validate::email(&form.email)?;

    let fields = build_fields(&form.email, form.new_qr, cfg.user.as_deref());

    debug!(
        email = %form.email,
        new_qr = form.new_qr,
        files = form.files.len(),
        total_size = form.total_size(),
        url = %cfg.upload_url,
        "submitting upload"
    );

    let raw = transport.post_multipart(&cfg.upload_url, &fields, &form.files, cfg.upload_timeout)?;

    match response::decode(raw)? {
        UploadResponse::Completed { share_link, qr_code } => {
            info!(share_link = %share_link, "qr code received");
            let qr_path = cfg
                .qr_output_dir
                .as_deref()
                .and_then(|dir| save_qr(dir, &qr_code));
            form.files.clear();
            Ok(UploadOutcome::Completed {
                share_link,
                qr_code,
                qr_path,
            })
        }
        UploadResponse::Accepted => {
            info!(email = %form.email, "workflow started in background");
            Ok(UploadOutcome::Accepted {
                email: form.email.clone(),
            })
        }
    }
}

fn build_fields(email: &str, new_qr: bool, user: Option<&str>) -> Vec<(&'static str, String)> {
    let now = Utc::now();
    let mut fields = vec![
        ("email", email.to_string()),
        ("newQR", new_qr.to_string()),
        ("dateFormatted", now.format("%Y-%m-%d").to_string()),
    ];
    if let Some(user) = user {
        fields.push(("user", user.to_string()));
        fields.push(("timestamp", now.to_rfc3339()));
    }
    fields
}

/// Write the decoded QR image; failures are logged and leave the result intact.
fn save_qr(dir: &Path, qr_code: &str) -> Option<PathBuf> {
    let bytes = match STANDARD.decode(qr_code.trim()) {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "qr code is not valid base64, not saved");
            return None;
        }
    };

    let now = Utc::now();
    let path = dir.join(format!(
        "qr-{}-{}.png",
        now.format("%Y-%m-%d"),
        now.timestamp_millis()
    ));

    if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&path, &bytes)) {
        warn!(path = %path.display(), error = %e, "failed to write qr image");
        return None;
    }

    debug!(path = %path.display(), bytes = bytes.len(), "qr image saved");
    Some(path)
}
