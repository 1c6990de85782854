//! Snapshot codecs for the persisted chat and auth records.
//!
//! Both records are JSON documents wrapped in `{ "state": ..., "version": 0 }`.
//! Writing is strict. Reading is lenient: any chatroom, message or user that
//! fails to decode (typically a corrupted timestamp) is dropped with a warning
//! and the rest of the document is kept, so a load never fails.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::ChatroomId;
use crate::chat::core::models::{Chatroom, Message, User};

/// Layout version written into every record.
pub const SNAPSHOT_VERSION: u32 = 0;

#[derive(Serialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

fn encode_envelope<T: Serialize>(state: T) -> ChatResult<String> {
    Ok(serde_json::to_string(&Envelope {
        state,
        version: SNAPSHOT_VERSION,
    })?)
}

/// Parse a record and return its `state` object, or `None` when unusable.
fn open_envelope(raw: &str, record: &'static str) -> Option<Map<String, Value>> {
    let document: Value = match serde_json::from_str(raw) {
        Ok(document) => document,
        Err(err) => {
            warn!(record, %err, "Persisted record is not valid JSON, ignoring it");
            return None;
        }
    };

    let Value::Object(mut document) = document else {
        warn!(record, "Persisted record is not an object, ignoring it");
        return None;
    };

    let version = document.get("version").and_then(Value::as_u64);
    if let Some(version) = version.filter(|v| *v != u64::from(SNAPSHOT_VERSION)) {
        debug!(record, version, "Reading persisted record with a different layout version");
    }

    match document.remove("state") {
        Some(Value::Object(state)) => Some(state),
        Some(_) => {
            warn!(record, "Persisted record has a non-object state, ignoring it");
            None
        }
        // Bare state without envelope.
        None => Some(document),
    }
}

/// Borrowed view of the persisted chat fields, used on every write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshotView<'a> {
    /// Chatrooms, most recent first.
    pub chatrooms: &'a [Chatroom],
    /// Message lists keyed by chatroom id.
    pub messages_by_chatroom: &'a HashMap<ChatroomId, Vec<Message>>,
    /// Theme flag.
    pub is_dark_mode: bool,
}

impl ChatSnapshotView<'_> {
    /// Serialize the snapshot into its persisted text form.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> ChatResult<String> {
        encode_envelope(self)
    }
}

/// Chat state restored from durable storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    /// Chatrooms, most recent first.
    pub chatrooms: Vec<Chatroom>,
    /// Message lists keyed by chatroom id; one per chatroom.
    pub messages_by_chatroom: HashMap<ChatroomId, Vec<Message>>,
    /// Theme flag.
    pub is_dark_mode: bool,
}

impl ChatSnapshot {
    /// Decode a persisted chat record, dropping malformed parts.
    ///
    /// The result always satisfies the store invariants: chatroom ids are
    /// unique, every chatroom has a message list, every list belongs to a
    /// known chatroom and every message points at the list holding it.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        let Some(mut state) = open_envelope(raw, "chat") else {
            return Self::default();
        };

        let mut snapshot = Self::default();
        let mut known: HashSet<ChatroomId> = HashSet::new();

        if let Some(Value::Array(items)) = state.remove("chatrooms") {
            for item in items {
                match serde_json::from_value::<Chatroom>(item) {
                    Ok(room) if known.contains(room.id.as_str()) => {
                        warn!(chatroom_id = %room.id, "Dropping duplicated chatroom record");
                    }
                    Ok(room) => {
                        known.insert(room.id.clone());
                        snapshot.chatrooms.push(room);
                    }
                    Err(err) => warn!(%err, "Dropping malformed chatroom record"),
                }
            }
        }

        if let Some(Value::Object(lists)) = state.remove("messagesByChatroom") {
            for (chatroom_id, list) in lists {
                if !known.contains(chatroom_id.as_str()) {
                    warn!(%chatroom_id, "Dropping messages of an unknown chatroom");
                    continue;
                }
                let messages = decode_messages(&chatroom_id, list);
                snapshot
                    .messages_by_chatroom
                    .insert(ChatroomId::from(chatroom_id), messages);
            }
        }

        for room in &snapshot.chatrooms {
            snapshot
                .messages_by_chatroom
                .entry(room.id.clone())
                .or_default();
        }

        snapshot.is_dark_mode = state
            .get("isDarkMode")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        snapshot
    }
}

fn decode_messages(chatroom_id: &str, list: Value) -> Vec<Message> {
    let Value::Array(items) = list else {
        warn!(%chatroom_id, "Message list is not an array, starting it empty");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Message>(item) {
            Ok(message) if message.chatroom_id.as_str() == chatroom_id => Some(message),
            Ok(message) => {
                warn!(
                    %chatroom_id,
                    message_id = %message.id,
                    "Dropping message filed under the wrong chatroom"
                );
                None
            }
            Err(err) => {
                warn!(%chatroom_id, %err, "Dropping malformed message record");
                None
            }
        })
        .collect()
}

/// Auth state persisted under its own key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    /// The authenticated user, if any.
    pub user: Option<User>,
}

impl AuthSnapshot {
    /// Serialize the snapshot into its persisted text form.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> ChatResult<String> {
        encode_envelope(self)
    }

    /// Decode a persisted auth record; a malformed user reads as logged out.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        let Some(mut state) = open_envelope(raw, "auth") else {
            return Self::default();
        };

        let user = match state.remove("user") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<User>(value) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(%err, "Dropping malformed user record");
                    None
                }
            },
        };

        Self { user }
    }
}
