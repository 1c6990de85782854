//! Synthetic history pages prepended when older messages are requested.
//!
//! There is no real backend history: every page is fabricated. Timestamps
//! walk backwards from an anchor (the oldest message already loaded) in
//! random steps, so a page always sorts strictly before what it precedes.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::chat::core::ids::{ChatroomId, MessageId};
use crate::chat::core::models::Message;
use crate::chat::core::time::now_millis;

/// Smallest gap between two synthetic messages.
const MIN_GAP_MS: i64 = 1_000;

/// Largest gap between two synthetic messages.
const MAX_GAP_MS: i64 = 10 * 60 * 1_000;

/// Fabricate `count` messages strictly older than `anchor`, oldest first.
///
/// With no anchor (empty chatroom) the page ends just before "now".
#[must_use]
pub fn synthesize_page<R: Rng + ?Sized>(
    chatroom_id: &ChatroomId,
    anchor: Option<DateTime<Utc>>,
    count: usize,
    rng: &mut R,
) -> Vec<Message> {
    let mut cursor = anchor.unwrap_or_else(now_millis);
    let mut page = Vec::with_capacity(count);

    for index in 0..count {
        cursor -= TimeDelta::milliseconds(rng.gen_range(MIN_GAP_MS..=MAX_GAP_MS));
        let ordinal = index + 1;
        let is_user = rng.gen_bool(0.5);
        let content = if is_user {
            format!("User message {ordinal}: This is a sample user message with some content.")
        } else {
            format!(
                "AI response {ordinal}: This is a simulated assistant response with helpful information."
            )
        };

        page.push(Message {
            id: MessageId::new(),
            content,
            is_user,
            timestamp: cursor,
            image: None,
            chatroom_id: chatroom_id.clone(),
        });
    }

    page.reverse();
    page
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_page_is_chronological_and_strictly_older() {
        let anchor = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = ChatroomId::from("c1");
        let page = synthesize_page(&id, Some(anchor), 20, &mut rand::thread_rng());

        assert_eq!(page.len(), 20);
        assert!(page.iter().all(|m| m.timestamp < anchor));
        assert!(page.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
        assert!(page.iter().all(|m| m.chatroom_id == id && m.image.is_none()));
    }

    #[test]
    fn test_empty_chatroom_anchors_on_now() {
        let before = now_millis();
        let page = synthesize_page(&ChatroomId::from("c1"), None, 3, &mut rand::thread_rng());
        assert_eq!(page.len(), 3);
        assert!(page.iter().all(|m| m.timestamp <= before));
    }

    #[test]
    fn test_content_matches_author() {
        let page = synthesize_page(&ChatroomId::from("c1"), None, 50, &mut rand::thread_rng());
        for message in &page {
            if message.is_user {
                assert!(message.content.starts_with("User message"));
            } else {
                assert!(message.content.starts_with("AI response"));
            }
        }
    }

    #[test]
    fn test_zero_count() {
        assert!(synthesize_page(&ChatroomId::from("c1"), None, 0, &mut rand::thread_rng()).is_empty());
    }
}
