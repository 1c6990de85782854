//! Derived text fields: chatroom previews and titles.

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Maximum characters kept in a chatroom's last-message preview.
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Maximum characters kept in a title derived from a first message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Keep the first `max_chars` characters, appending [`ELLIPSIS`] when cut.
///
/// Counts `char`s, so multi-byte characters are never split.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_owned(),
    }
}

/// Preview shown as a chatroom's last message.
#[must_use]
pub fn message_preview(content: &str) -> String {
    truncate_with_ellipsis(content, PREVIEW_MAX_CHARS)
}

/// Title derived from the first user message, `None` when the text is blank.
#[must_use]
pub fn title_from_message(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_with_ellipsis(trimmed, TITLE_MAX_CHARS))
}
