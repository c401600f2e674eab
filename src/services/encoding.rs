//! Decoding of text files handed to the translator.
//!
//! Chinese sources often arrive as GBK/GB18030 or Big5 rather than UTF-8.

use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, WebhookError};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DecodedText {
    pub encoding: String,
    pub text: String,
    pub had_errors: bool,
}

pub fn decode_file(path: &Path) -> Result<DecodedText> {
    let bytes = fs::read(path)?;
    let decoded = decode_bytes(&bytes);
    debug!(
        path = %path.display(),
        encoding = %decoded.encoding,
        had_errors = decoded.had_errors,
        "decoded text file"
    );
    if decoded.text.trim().is_empty() {
        return Err(WebhookError::validation("File không có nội dung văn bản."));
    }
    Ok(decoded)
}

pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText {
            encoding: format!("{}-sig", encoding.name().to_lowercase()),
            text: text.into_owned(),
            had_errors,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(bytes);
    DecodedText {
        encoding: encoding.name().to_lowercase(),
        text: text.into_owned(),
        had_errors,
    }
}

fn bom(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((UTF_8, 3))
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Some((UTF_16LE, 2))
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Some((UTF_16BE, 2))
    } else {
        None
    }
}
