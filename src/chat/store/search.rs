//! Read-side search projection over the chatroom list.

use crate::chat::core::models::Chatroom;

/// Chatrooms visible under `query`, order preserved.
///
/// A blank query shows everything; otherwise a chatroom is visible when its
/// title contains the query, ignoring case.
#[must_use]
pub fn filter_chatrooms<'a>(chatrooms: &'a [Chatroom], query: &str) -> Vec<&'a Chatroom> {
    if query.trim().is_empty() {
        return chatrooms.iter().collect();
    }

    let needle = query.to_lowercase();
    chatrooms
        .iter()
        .filter(|room| room.title.to_lowercase().contains(&needle))
        .collect()
}
