#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;

use qrdocs_core::protocol::invalid_utf8_reply;
use qrdocs_core::services::history::{History, JsonFileStore};
use qrdocs_core::services::webhook::HttpTransport;
use qrdocs_core::{Config, Core};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_env();
    info!(
        upload_url = %config.upload_url,
        translate_url = %config.translate_url,
        history = %config.history_file.display(),
        "webhook client starting"
    );

    let transport = match HttpTransport::new() {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "cannot start");
            std::process::exit(1);
        }
    };
    let history = History::new(Box::new(JsonFileStore::new(config.history_file.clone())));
    let mut core = Core::new(config, Box::new(transport), history);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "failed to read request");
                break;
            }
        }

        let raw = trim_line_end(&buf);
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = match std::str::from_utf8(raw) {
            Ok(line) => {
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| core.handle(line)));
                match result {
                    Ok(resp) => resp,
                    Err(_) => {
                        error!("handler panicked");
                        serde_json::json!({
                            "status": "error",
                            "message": "internal core error"
                        })
                        .to_string()
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "request line is not valid utf-8");
                invalid_utf8_reply(raw)
            }
        };

        if let Err(e) = writeln!(stdout, "{response}").and_then(|_| stdout.flush()) {
            error!(error = %e, "failed to write response");
            break;
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
