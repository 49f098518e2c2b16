//! Sheet name → directory name mapping.
//!
//! Display names may contain anything an importer produced. Directory names
//! are derived by splitting on the host's invalid filename characters,
//! dropping empty fragments, and joining the rest with `_`.
//!
//! The mapping is lossy. Two display names that sanitize to the same
//! directory share one sheet: the later save replaces the earlier data.
//!
//! The length cap counts Unicode scalar values. Storage written by tools
//! that count UTF-16 code units keeps fewer characters for names outside
//! the Basic Multilingual Plane (most emoji take two units each), so such
//! names can map to a longer directory here.

use crate::config::MAX_NAME_LEN;

/// Separator used to join surviving fragments.
pub const FRAGMENT_SEPARATOR: char = '_';

/// Whether `c` may not appear in a file name on this platform.
#[cfg(windows)]
#[must_use]
pub fn is_invalid_filename_char(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|' | ':' | '*' | '?' | '\\' | '/') || c < '\u{20}'
}

/// Whether `c` may not appear in a file name on this platform.
#[cfg(not(windows))]
#[must_use]
pub fn is_invalid_filename_char(c: char) -> bool {
    matches!(c, '/' | '\0')
}

/// Sanitize a display name with the default length limit.
#[must_use]
pub fn sanitize(name: &str) -> String {
    sanitize_with_limit(name, MAX_NAME_LEN)
}

/// Sanitize a display name, keeping at most `max_len` characters.
#[must_use]
pub fn sanitize_with_limit(name: &str, max_len: usize) -> String {
    let joined = name
        .split(is_invalid_filename_char)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(&FRAGMENT_SEPARATOR.to_string());

    match joined.char_indices().nth(max_len) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

/// Directory name for a sheet, or `None` if the name cannot address a
/// sheet directory (empty after sanitizing, `.` or `..`).
#[must_use]
pub fn sheet_dir_name(name: &str, max_len: usize) -> Option<String> {
    let dir = sanitize_with_limit(name, max_len);
    match dir.as_str() {
        "" | "." | ".." => None,
        _ => Some(dir),
    }
}

/// Best-effort display name for a sheet directory.
///
/// Reverses the separator substitution; separators that were part of the
/// original name come back as spaces too.
#[must_use]
pub fn display_name(dir_name: &str) -> String {
    dir_name.replace(FRAGMENT_SEPARATOR, " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_untouched() {
        assert_eq!(sanitize("Sheet1"), "Sheet1");
        assert_eq!(sanitize("Café ☕"), "Café ☕");
    }

    #[test]
    fn test_invalid_chars_become_single_separator() {
        assert_eq!(sanitize("a/b"), "a_b");
        assert_eq!(sanitize("a//b"), "a_b");
        assert_eq!(sanitize("/lead/trail/"), "lead_trail");
        assert_eq!(sanitize("nul\0byte"), "nul_byte");
    }

    #[test]
    fn test_empty_and_all_invalid_inputs() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("///"), "");
        assert_eq!(sheet_dir_name("///", MAX_NAME_LEN), None);
        assert_eq!(sheet_dir_name("..", MAX_NAME_LEN), None);
        assert_eq!(sheet_dir_name(".", MAX_NAME_LEN), None);
        assert_eq!(sheet_dir_name("N5", MAX_NAME_LEN), Some("N5".to_string()));
    }

    #[test]
    fn test_output_is_bounded_and_clean() {
        let inputs = [
            "x".repeat(200),
            "日本語".repeat(40),
            "a/".repeat(80),
            "\0/\0/".to_string(),
            "🍣🍜🍱".repeat(30),
        ];
        for input in &inputs {
            let out = sanitize(input);
            assert!(out.chars().count() <= MAX_NAME_LEN, "too long: {out}");
            assert!(!out.chars().any(is_invalid_filename_char), "dirty: {out:?}");
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let out = sanitize(&"語".repeat(60));
        assert_eq!(out.chars().count(), 50);
        assert_eq!(sanitize_with_limit("abcdef", 3), "abc");
    }

    #[test]
    fn test_cap_counts_scalar_values_not_utf16_units() {
        let out = sanitize(&"☕🍵".repeat(40));
        assert_eq!(out.chars().count(), 50);
        assert_eq!(out.encode_utf16().count(), 75);
    }

    #[test]
    fn test_collision_is_deterministic() {
        assert_eq!(sanitize("a/b"), sanitize("a//b"));
    }

    #[test]
    fn test_display_name_reverses_separator() {
        assert_eq!(display_name("Lesson_1"), "Lesson 1");
        assert_eq!(display_name(&sanitize("a/b")), "a b");
    }
}
