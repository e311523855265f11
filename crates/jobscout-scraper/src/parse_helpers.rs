//! Lenient numeric parsing for values scraped out of rendered text.

/// Parses the leading decimal number of `s`, ignoring leading whitespace.
///
/// `"3.8 ★"` → `Some(3.8)`, `"★"` → `None`.
pub(crate) fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Parses a result count such as `"1,234 Jobs"`: thousands separators are
/// dropped, then the leading integer is read. Returns `None` unless the
/// result is a positive integer.
pub(crate) fn parse_count(s: &str) -> Option<usize> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    let digits: String = cleaned.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Collapses every run of whitespace (including newlines) to one space.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
