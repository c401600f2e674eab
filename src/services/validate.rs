use std::sync::OnceLock;

use regex::Regex;
use tracing::error;

use crate::error::{Result, WebhookError};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const CJK_PATTERN: &str = r"[\x{4E00}-\x{9FFF}]";

fn email_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| compile(EMAIL_PATTERN)).as_ref()
}

fn cjk_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| compile(CJK_PATTERN)).as_ref()
}

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| error!(pattern, error = %e, "validation pattern does not compile"))
        .ok()
}

/// A pattern that failed to compile matches nothing, so input is rejected.
pub fn is_valid_email(email: &str) -> bool {
    email_re().is_some_and(|re| re.is_match(email))
}

/// True when the text holds at least one CJK Unified Ideograph.
pub fn contains_cjk(text: &str) -> bool {
    cjk_re().is_some_and(|re| re.is_match(text))
}

pub fn email(email: &str) -> Result<()> {
    if email.is_empty() || !is_valid_email(email) {
        return Err(WebhookError::validation("Vui lòng nhập địa chỉ email hợp lệ."));
    }
    Ok(())
}

pub fn chinese_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(WebhookError::validation("Vui lòng nhập văn bản cần dịch."));
    }
    if !contains_cjk(text) {
        return Err(WebhookError::validation(
            "Văn bản phải chứa ít nhất một ký tự tiếng Trung.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        assert!(email_re().is_some());
        assert!(cjk_re().is_some());
    }

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("kwok@pacific.vn"));
        assert!(is_valid_email("a.b+c@mail.example.com"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "a@b", "@b.co", "a b@c.de", "a@b c.de", "a@@b.co"] {
            assert!(email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn cjk_detection() {
        assert!(contains_cjk("你好"));
        assert!(contains_cjk("hello 世界"));
        assert!(!contains_cjk("xin chào"));
        // hiragana sits outside the unified ideograph block
        assert!(!contains_cjk("ひらがな"));
    }

    #[test]
    fn chinese_text_rejects_blank_and_non_cjk() {
        assert!(matches!(chinese_text("   "), Err(WebhookError::Validation(_))));
        assert!(matches!(chinese_text("hello"), Err(WebhookError::Validation(_))));
        assert!(chinese_text(" 中文 ").is_ok());
    }
}
