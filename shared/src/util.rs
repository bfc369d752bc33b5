/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh opaque record id (uuid v4, hyphenated)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Payment reference: `REF` followed by the last 8 digits of the millisecond clock
pub fn payment_reference(now: i64) -> String {
    let digits = now.rem_euclid(100_000_000);
    format!("REF{:08}", digits)
}

/// Shorten text for previews: longer than 50 chars keeps the first 47 plus `...`
///
/// Counts chars, not bytes, so multi-byte text (Thai menu names) never splits
/// inside a code point.
pub fn preview_text(content: &str) -> String {
    const MAX_PREVIEW: usize = 50;
    const KEEP: usize = 47;
    if content.chars().count() > MAX_PREVIEW {
        let head: String = content.chars().take(KEEP).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        let text = "a".repeat(50);
        assert_eq!(preview_text(&text), text);
    }

    #[test]
    fn test_preview_long_text_truncated() {
        let text = "b".repeat(51);
        let preview = preview_text(&text);
        assert_eq!(preview.chars().count(), 50);
        assert!(preview.ends_with("..."));
        assert_eq!(&preview[..47], &text[..47]);
    }

    #[test]
    fn test_preview_multibyte() {
        let text = "ผัดไทย".repeat(10);
        let preview = preview_text(&text);
        assert_eq!(preview.chars().count(), 50);
    }

    #[test]
    fn test_payment_reference_format() {
        assert_eq!(payment_reference(1_712_345_678_901), "REF45678901");
        assert_eq!(payment_reference(42), "REF00000042");
    }
}
