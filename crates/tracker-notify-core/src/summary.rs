//! Plain-text extraction from message parts.

use crate::message::MessagePart;

/// Maximum number of characters kept in any summary or captured text.
pub const MAX_SUMMARY_CHARS: usize = 600;

/// Keep at most `max_chars` Unicode scalar values of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Join the text of every non-ignored text part with newlines, trim, and
/// cap at [`MAX_SUMMARY_CHARS`].
///
/// Returns an empty string when no part qualifies.
pub fn summarize(parts: &[MessagePart]) -> String {
    let joined = parts
        .iter()
        .filter(|p| p.is_summarizable())
        .map(|p| p.text.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_chars(joined.trim(), MAX_SUMMARY_CHARS)
}
