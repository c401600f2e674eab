use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, WebhookError};
use crate::model::session::Session;
use crate::services::history::History;
use crate::services::render::Render;
use crate::services::upload::{self, UploadOutcome};
use crate::services::webhook::Transport;
use crate::services::{encoding, selection, translate};

mod command;
pub use command::Command;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

#[derive(Debug, Default, Deserialize)]
struct FormPatch {
    email: Option<String>,
    new_qr: Option<bool>,
}

fn parse_payload<T: Default + for<'de> Deserialize<'de>>(payload: &Value) -> Result<T> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload.clone())
        .map_err(|e| WebhookError::validation(format!("invalid payload: {e}")))
}

fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| WebhookError::validation(format!("payload.{key} is required")))
}

/// Reply for a request line that is not valid UTF-8.
///
/// The `id` is recovered from a lossy decode when the line is still JSON, so
/// the front-end can match the failure to its request.
pub fn invalid_utf8_reply(line: &[u8]) -> String {
    let id = serde_json::from_str::<Value>(&String::from_utf8_lossy(line))
        .map(|req| get_id(&req))
        .unwrap_or(Value::Null);

    json!({
        "id": id,
        "status": "error",
        "kind": "validation",
        "message": "invalid utf-8"
    })
    .to_string()
}

/// One engine instance: session state plus the capabilities handlers use.
pub struct Core {
    pub session: Session,
    config: Config,
    transport: Box<dyn Transport>,
    history: History,
}

impl Core {
    pub fn new(config: Config, transport: Box<dyn Transport>, history: History) -> Self {
        Self {
            session: Session::default(),
            config,
            transport,
            history,
        }
    }

    /// Handle one request line and produce one response line.
    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);
        let cmd = Command::from(cmd_str);

        debug!(cmd = cmd_str, "handling command");

        if cmd == Command::Unknown {
            return json!({
                "id": id,
                "status": "error",
                "kind": "unknown_command",
                "message": "unknown command"
            })
            .to_string();
        }

        let result = self.dispatch(cmd, payload);
        let state = self.session.snapshot();

        let response = match result {
            Ok(render) => json!({
                "id": id,
                "status": "ok",
                "payload": { "render": render, "state": state }
            }),
            Err(e) => {
                warn!(cmd = cmd_str, kind = e.kind(), error = %e, "command failed");
                let render = Render::error(cmd.error_context(), &e);
                json!({
                    "id": id,
                    "status": "error",
                    "kind": e.kind(),
                    "message": e.to_string(),
                    "payload": { "render": render, "state": state }
                })
            }
        };

        response.to_string()
    }

    fn dispatch(&mut self, cmd: Command, payload: &Value) -> Result<Render> {
        match cmd {
            Command::Ping => Ok(Render::notice("qrdocs-core alive")),
            Command::ConfigGet => Ok(Render::Config {
                config: self.config.clone(),
            }),
            Command::WebhookProbe => self.probe(),
            Command::FilesAdd => self.add_files(payload),
            Command::FilesRemove => self.remove_file(payload),
            Command::FormSet => {
                self.apply_form_patch(parse_payload(payload)?);
                Ok(Render::Form)
            }
            Command::FormReset => {
                self.session.form.reset();
                Ok(Render::notice("Form đã được làm mới!"))
            }
            Command::FormState => Ok(Render::Form),
            Command::UploadSubmit => self.submit_upload(payload),
            Command::TranslateSubmit => {
                let text = required_str(payload, "text")?.to_string();
                self.translate(&text)
            }
            Command::TranslateFile => {
                let path = PathBuf::from(required_str(payload, "path")?);
                let decoded = encoding::decode_file(&path)?;
                self.translate(&decoded.text)
            }
            Command::HistoryList => Ok(Render::History {
                entries: self.history.entries(),
            }),
            Command::HistoryClear => {
                self.history.clear()?;
                info!("history cleared");
                Ok(Render::History { entries: Vec::new() })
            }
            Command::Unknown => Err(WebhookError::validation("unknown command")),
        }
    }

    fn apply_form_patch(&mut self, patch: FormPatch) {
        if let Some(email) = patch.email {
            self.session.form.email = email;
        }
        if let Some(new_qr) = patch.new_qr {
            self.session.form.new_qr = new_qr;
        }
    }

    fn add_files(&mut self, payload: &Value) -> Result<Render> {
        let paths: Vec<String> = payload
            .get("paths")
            .and_then(|v| v.as_array())
            .and_then(|items| items.iter().map(|v| v.as_str().map(str::to_string)).collect())
            .ok_or_else(|| WebhookError::validation("payload.paths must be an array of strings"))?;

        let files = &mut self.session.form.files;
        selection::check_capacity(files.len(), paths.len())?;

        let (loaded, load_errors) = selection::read_paths(&paths);
        let report = selection::add(files, loaded)?;

        let warnings = load_errors
            .iter()
            .chain(report.rejected.iter())
            .map(ToString::to_string)
            .collect();

        info!(added = report.added, total = files.len(), "files selected");
        Ok(Render::Files {
            added: report.added,
            skipped_duplicates: report.skipped_duplicates,
            warnings,
        })
    }

    fn remove_file(&mut self, payload: &Value) -> Result<Render> {
        let index = payload
            .get("index")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| WebhookError::validation("payload.index is required"))?;
        selection::remove(&mut self.session.form.files, index as usize)?;
        Ok(Render::Form)
    }

    fn submit_upload(&mut self, payload: &Value) -> Result<Render> {
        self.apply_form_patch(parse_payload(payload)?);

        match upload::submit(&mut self.session.form, self.transport.as_ref(), &self.config)? {
            UploadOutcome::Completed {
                share_link,
                qr_code,
                qr_path,
            } => Ok(Render::qr_result(
                share_link,
                &qr_code,
                qr_path.map(|p| p.to_string_lossy().to_string()),
            )),
            UploadOutcome::Accepted { email } => Ok(Render::pending(&email)),
        }
    }

    fn translate(&mut self, text: &str) -> Result<Render> {
        let translated = translate::submit(
            &self.session.translating,
            text,
            self.transport.as_ref(),
            &self.config,
            &mut self.history,
        )?;
        Ok(Render::translation(translated))
    }

    fn probe(&self) -> Result<Render> {
        let raw = self.transport.get(&self.config.upload_url, Some(PROBE_TIMEOUT))?;
        info!(status = raw.status, "webhook probe answered");
        Ok(Render::notice(format!(
            "Webhook phản hồi: HTTP {} {}",
            raw.status, raw.status_text
        )))
    }
}
