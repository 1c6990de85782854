//! The conversation store: single source of truth for chatrooms and messages.
//!
//! All operations are synchronous and total. Operations naming an unknown
//! chatroom are silent no-ops. Every mutation of chatrooms, messages or the
//! theme flag is written through to durable storage as a full snapshot;
//! storage failures are logged and never abort the in-memory change.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chat::core::config::{PaginationConfig, StorageConfig};
use crate::chat::core::ids::ChatroomId;
use crate::chat::core::models::{Chatroom, Message};
use crate::chat::core::text::message_preview;
use crate::chat::persistence::kv_store::{KeyValueStore, MemoryKeyValueStore};
use crate::chat::persistence::snapshot::{ChatSnapshot, ChatSnapshotView};
use crate::chat::store::pagination::synthesize_page;
use crate::chat::store::search::filter_chatrooms;

/// Store handle shared between the session and the reply scheduler.
pub type SharedChatStore = Arc<Mutex<ChatStore>>;

/// In-memory conversation state mirrored to durable storage.
pub struct ChatStore {
    chatrooms: Vec<Chatroom>,
    messages: HashMap<ChatroomId, Vec<Message>>,
    current_chatroom_id: Option<ChatroomId>,
    is_typing: bool,
    search_query: String,
    is_dark_mode: bool,
    storage: Box<dyn KeyValueStore>,
    storage_key: String,
    pagination: PaginationConfig,
}

impl ChatStore {
    /// Rehydrate the store from `storage`.
    ///
    /// Never fails: an unreadable or malformed record yields the valid parts
    /// of it, or an empty store.
    #[must_use]
    pub fn load(
        storage: Box<dyn KeyValueStore>,
        storage_key: impl Into<String>,
        pagination: PaginationConfig,
    ) -> Self {
        let storage_key = storage_key.into();
        let snapshot = match storage.get(&storage_key) {
            Ok(Some(raw)) => ChatSnapshot::decode(&raw),
            Ok(None) => ChatSnapshot::default(),
            Err(err) => {
                warn!(%err, key = %storage_key, "Failed to read chat state, starting empty");
                ChatSnapshot::default()
            }
        };

        info!(
            chatrooms = snapshot.chatrooms.len(),
            dark_mode = snapshot.is_dark_mode,
            "Chat store rehydrated"
        );

        Self {
            chatrooms: snapshot.chatrooms,
            messages: snapshot.messages_by_chatroom,
            current_chatroom_id: None,
            is_typing: false,
            search_query: String::new(),
            is_dark_mode: snapshot.is_dark_mode,
            storage,
            storage_key,
            pagination,
        }
    }

    /// Empty store backed by volatile memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(
            Box::new(MemoryKeyValueStore::new()),
            StorageConfig::default().chat_key,
            PaginationConfig::default(),
        )
    }

    /// Wrap into the shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedChatStore {
        Arc::new(Mutex::new(self))
    }

    fn persist(&self) {
        let view = ChatSnapshotView {
            chatrooms: &self.chatrooms,
            messages_by_chatroom: &self.messages,
            is_dark_mode: self.is_dark_mode,
        };
        let written = view
            .encode()
            .and_then(|raw| self.storage.set(&self.storage_key, &raw));
        if let Err(err) = written {
            warn!(%err, key = %self.storage_key, "Failed to persist chat state");
        }
    }

    // ===== Mutations ========================================================

    /// Insert a chatroom at the front and create its empty message list.
    ///
    /// A chatroom whose id is already present is ignored.
    pub fn add_chatroom(&mut self, chatroom: Chatroom) {
        if self.messages.contains_key(chatroom.id.as_str()) {
            warn!(chatroom_id = %chatroom.id, "Ignoring chatroom with a duplicate id");
            return;
        }

        debug!(chatroom_id = %chatroom.id, "Adding chatroom");
        self.messages.insert(chatroom.id.clone(), Vec::new());
        self.chatrooms.insert(0, chatroom);
        self.persist();
    }

    /// Set the active chatroom pointer without validating it.
    pub fn set_current_chatroom(&mut self, id: Option<ChatroomId>) {
        self.current_chatroom_id = id;
    }

    /// Append a message and refresh its chatroom's preview fields.
    pub fn add_message(&mut self, message: Message) {
        let Some(room) = self
            .chatrooms
            .iter_mut()
            .find(|room| room.id == message.chatroom_id)
        else {
            debug!(chatroom_id = %message.chatroom_id, "Dropping message for unknown chatroom");
            return;
        };

        room.last_message = Some(message_preview(&message.content));
        room.last_message_time = message.timestamp;
        self.messages
            .entry(message.chatroom_id.clone())
            .or_default()
            .push(message);
        self.persist();
    }

    /// Rewrite a chatroom's title.
    pub fn update_chatroom_title(&mut self, id: &str, title: impl Into<String>) {
        let Some(room) = self.chatrooms.iter_mut().find(|room| room.id.as_str() == id) else {
            debug!(chatroom_id = id, "Ignoring title update for unknown chatroom");
            return;
        };

        room.title = title.into();
        self.persist();
    }

    /// Remove a chatroom and discard its messages.
    ///
    /// Returns whether anything was removed.
    pub fn delete_chatroom(&mut self, id: &str) -> bool {
        let before = self.chatrooms.len();
        self.chatrooms.retain(|room| room.id.as_str() != id);
        let removed_messages = self.messages.remove(id);
        if self.chatrooms.len() == before && removed_messages.is_none() {
            return false;
        }

        if self.current_chatroom_id.as_ref().is_some_and(|current| current.as_str() == id) {
            self.current_chatroom_id = None;
        }

        info!(chatroom_id = id, "Deleted chatroom");
        self.persist();
        true
    }

    /// Set the typing indicator.
    pub const fn set_typing(&mut self, is_typing: bool) {
        self.is_typing = is_typing;
    }

    /// Set the chatroom search filter.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Flip the theme flag and return its new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.is_dark_mode = !self.is_dark_mode;
        self.persist();
        self.is_dark_mode
    }

    /// Prepend a page of synthetic older messages.
    ///
    /// Returns the number of messages added (zero for an unknown chatroom).
    pub fn load_more_messages(&mut self, chatroom_id: &str) -> usize {
        let page_size = self.pagination.page_size;
        let Some((id, list)) = self.messages.get_key_value(chatroom_id) else {
            debug!(chatroom_id, "Ignoring history request for unknown chatroom");
            return 0;
        };

        let anchor = list.first().map(|message| message.timestamp);
        let page = synthesize_page(id, anchor, page_size, &mut rand::thread_rng());
        let added = page.len();

        if let Some(list) = self.messages.get_mut(chatroom_id) {
            list.splice(0..0, page);
        }

        debug!(chatroom_id, added, "Prepended history page");
        self.persist();
        added
    }

    /// Drop every chatroom and message of the session (logout cascade).
    ///
    /// The theme flag is a device preference and survives.
    pub fn clear_session(&mut self) {
        let cleared = self.chatrooms.len();
        self.chatrooms.clear();
        self.messages.clear();
        self.current_chatroom_id = None;
        self.is_typing = false;
        self.search_query.clear();
        info!(chatrooms = cleared, "Cleared chat session");
        self.persist();
    }

    // ===== Reads ============================================================

    /// All chatrooms, most recent first.
    #[must_use]
    pub fn chatrooms(&self) -> &[Chatroom] {
        &self.chatrooms
    }

    /// Chatrooms matching the current search query.
    #[must_use]
    pub fn visible_chatrooms(&self) -> Vec<&Chatroom> {
        filter_chatrooms(&self.chatrooms, &self.search_query)
    }

    /// Look up a chatroom.
    #[must_use]
    pub fn chatroom(&self, id: &str) -> Option<&Chatroom> {
        self.chatrooms.iter().find(|room| room.id.as_str() == id)
    }

    /// Messages of a chatroom, oldest first.
    #[must_use]
    pub fn messages(&self, chatroom_id: &str) -> Option<&[Message]> {
        self.messages.get(chatroom_id).map(Vec::as_slice)
    }

    /// The active chatroom id, if it still refers to a chatroom.
    #[must_use]
    pub fn current_chatroom_id(&self) -> Option<&ChatroomId> {
        self.current_chatroom_id
            .as_ref()
            .filter(|id| self.chatroom(id.as_str()).is_some())
    }

    /// The active chatroom, if any.
    #[must_use]
    pub fn current_chatroom(&self) -> Option<&Chatroom> {
        self.current_chatroom_id
            .as_ref()
            .and_then(|id| self.chatroom(id.as_str()))
    }

    /// Messages of the active chatroom; empty when there is none.
    #[must_use]
    pub fn current_messages(&self) -> &[Message] {
        self.current_chatroom_id()
            .and_then(|id| self.messages(id.as_str()))
            .unwrap_or_default()
    }

    /// Whether an assistant reply is pending.
    #[must_use]
    pub const fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// The current search query.
    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Whether the dark theme is active.
    #[must_use]
    pub const fn is_dark_mode(&self) -> bool {
        self.is_dark_mode
    }
}
