//! Helpers for keeping client-supplied strings from breaking log lines.

use uuid::Uuid;

const MAX_PREVIEW: usize = 120;

/// Escape a request-supplied string for single-line logging and cap its length.
///
/// Newlines, carriage returns, tabs and backslashes are escaped; other control
/// characters become `\xNN`. Anything past `MAX_PREVIEW` characters is cut
/// and marked with an ellipsis.
pub fn escape_log(s: &str) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// First eight hex digits of a request id; enough to grep a log.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("Giant\nRat\t\x07"), "Giant\\nRat\\t\\x07");
    }

    #[test]
    fn truncates_long_values() {
        let long = "a".repeat(500);
        let escaped = escape_log(&long);
        assert_eq!(escaped.chars().count(), MAX_PREVIEW + 1);
        assert!(escaped.ends_with('…'));
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(short_id(&Uuid::new_v4()).len(), 8);
    }
}
