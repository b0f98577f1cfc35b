//! Small text helpers shared by the outbound adapters

/// Longest diagnostic payload kept in errors and logs
pub const MAX_DIAGNOSTIC_CHARS: usize = 300;

/// Truncate to at most `max` characters, never splitting a UTF-8 sequence
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate_chars("ok", 10), "ok");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "тривога".repeat(100);
        let out = truncate_chars(&s, MAX_DIAGNOSTIC_CHARS);
        assert_eq!(out.chars().count(), MAX_DIAGNOSTIC_CHARS + 1);
        assert!(out.ends_with('…'));
    }
}
