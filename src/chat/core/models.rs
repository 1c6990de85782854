//! Chat data model: users, chatrooms and messages.
//!
//! Field names serialize in camelCase, matching the persisted layout and the
//! JSON consumed by presentation layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::core::ids::{ChatroomId, MessageId, UserId};
use crate::chat::core::time::{now_millis, rfc3339_millis};

/// Placeholder title of a chatroom that has not received a user message yet.
pub const DEFAULT_CHATROOM_TITLE: &str = "New Chat";

/// Authenticated user record owned by the auth session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Phone number, without country code.
    pub phone: String,
    /// Dialing prefix, e.g. `+33`.
    pub country_code: String,
    /// Whether the login flow completed.
    pub is_authenticated: bool,
    /// Creation timestamp.
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly authenticated user.
    #[must_use]
    pub fn new(phone: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            phone: phone.into(),
            country_code: country_code.into(),
            is_authenticated: true,
            created_at: now_millis(),
        }
    }
}

/// A named, ordered conversation container owned by one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chatroom {
    /// Unique identifier.
    pub id: ChatroomId,
    /// Display title.
    pub title: String,
    /// Preview of the most recent message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    /// Timestamp of the most recent message (creation time until then).
    #[serde(with = "rfc3339_millis")]
    pub last_message_time: DateTime<Utc>,
    /// Creation timestamp.
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    /// Owner of the chatroom.
    pub user_id: UserId,
}

impl Chatroom {
    /// Build an untitled chatroom with a generated id.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self::with_id(ChatroomId::new(), user_id)
    }

    /// Build an untitled chatroom with a caller-chosen id.
    #[must_use]
    pub fn with_id(id: ChatroomId, user_id: UserId) -> Self {
        let now = now_millis();
        Self {
            id,
            title: DEFAULT_CHATROOM_TITLE.to_owned(),
            last_message: None,
            last_message_time: now,
            created_at: now,
            user_id,
        }
    }

    /// Whether the title is still the placeholder.
    #[must_use]
    pub fn is_untitled(&self) -> bool {
        self.title == DEFAULT_CHATROOM_TITLE
    }
}

/// A single immutable utterance from the user or the assistant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// Text content.
    pub content: String,
    /// `true` for user-authored messages, `false` for assistant replies.
    pub is_user: bool,
    /// Creation timestamp.
    #[serde(with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
    /// Optional image payload, already in a displayable form (e.g. data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Owning chatroom.
    pub chatroom_id: ChatroomId,
}

impl Message {
    /// Build a user message stamped with the current time.
    #[must_use]
    pub fn user(chatroom_id: ChatroomId, content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            is_user: true,
            timestamp: now_millis(),
            image,
            chatroom_id,
        }
    }

    /// Build an assistant message stamped with the current time.
    #[must_use]
    pub fn assistant(chatroom_id: ChatroomId, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            is_user: false,
            timestamp: now_millis(),
            image: None,
            chatroom_id,
        }
    }
}
