//! Whitespace cleanup and length capping for extracted article text.

/// Maximum number of characters kept from an article body.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Normalize raw article text:
/// - `\n` and `\t` become a space, `\r` is dropped
/// - runs of spaces collapse to a single space
/// - text longer than [`MAX_CONTENT_CHARS`] is cut at the last `.` inside the first
///   `MAX_CONTENT_CHARS` characters (period kept). Without a period the result is empty.
pub fn normalize(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\n' | '\t' => ' ',
            other => other,
        })
        .collect();

    truncate_at_sentence(&collapse_spaces(replaced), MAX_CONTENT_CHARS)
}

/// Replace double spaces until none remain.
pub fn collapse_spaces(mut text: String) -> String {
    while text.contains("  ") {
        text = text.replace("  ", " ");
    }
    text
}

/// Cut `text` to `max_chars` characters, then back to the last `.` of that prefix.
/// Text already within the limit is returned unchanged.
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    let prefix = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => return text.to_string(),
    };

    match prefix.rfind('.') {
        Some(idx) => prefix[..=idx].to_string(),
        None => String::new(),
    }
}
