//! Composition root for one signed-in device.
//!
//! `ChatSession` owns the shared store, the auth record and the reply
//! scheduler, and implements the flows the UI drives: signing in, opening a
//! new chat, sending a message, and the logout cascade.
//!
//! Locks nest in one order only: store, then auth or pending replies. Flows
//! that check the user do so while holding the store, so a concurrent logout
//! is either fully before or fully after them.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::chat::auth::AuthStore;
use crate::chat::core::config::ChatConfig;
use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::ChatroomId;
use crate::chat::core::models::{Chatroom, Message, User};
use crate::chat::core::text::title_from_message;
use crate::chat::persistence::kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
use crate::chat::responder::ResponseScheduler;
use crate::chat::store::chat_store::{ChatStore, SharedChatStore};

/// Session state shared by every request handler.
pub struct ChatSession {
    store: SharedChatStore,
    auth: Mutex<AuthStore>,
    responder: ResponseScheduler,
}

impl ChatSession {
    /// Open a session backed by the configured `SQLite` file.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the database
    /// cannot be opened.
    pub fn open(config: &ChatConfig) -> ChatResult<Self> {
        config.validate()?;
        let chat = SqliteKeyValueStore::open(&config.storage)?;
        let auth = SqliteKeyValueStore::open(&config.storage)?;
        info!(path = %config.storage.sqlite_path.display(), "Opened chat storage");
        Ok(Self::with_storage(Box::new(chat), Box::new(auth), config))
    }

    /// Open a session whose state lives only in memory.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn in_memory(config: &ChatConfig) -> ChatResult<Self> {
        config.validate()?;
        let backing = MemoryKeyValueStore::new();
        Ok(Self::with_storage(
            Box::new(backing.clone()),
            Box::new(backing),
            config,
        ))
    }

    /// Build a session over explicit storage backends.
    #[must_use]
    pub fn with_storage(
        chat_storage: Box<dyn KeyValueStore>,
        auth_storage: Box<dyn KeyValueStore>,
        config: &ChatConfig,
    ) -> Self {
        let store = ChatStore::load(
            chat_storage,
            config.storage.chat_key.clone(),
            config.pagination.clone(),
        )
        .into_shared();
        let auth = AuthStore::load(auth_storage, config.storage.auth_key.clone());
        let responder = ResponseScheduler::new(Arc::clone(&store), config.responder.clone());

        Self {
            store,
            auth: Mutex::new(auth),
            responder,
        }
    }

    /// Run a read-only projection against the store.
    pub async fn read<T>(&self, f: impl FnOnce(&ChatStore) -> T + Send) -> T {
        let store = self.store.lock().await;
        f(&store)
    }

    // ===== Auth =============================================================

    /// Sign in with a phone number, replacing any previous user.
    pub async fn login(
        &self,
        phone: impl Into<String> + Send,
        country_code: impl Into<String> + Send,
    ) -> User {
        let user = User::new(phone, country_code);
        self.auth.lock().await.set_user(Some(user.clone()));
        user
    }

    /// Replace the current user directly.
    pub async fn set_user(&self, user: Option<User>) {
        self.auth.lock().await.set_user(user);
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.auth.lock().await.user().cloned()
    }

    /// Sign out: cancel pending replies, drop all chatrooms and messages,
    /// then forget the user.
    pub async fn logout(&self) {
        let mut store = self.store.lock().await;
        self.responder.cancel_all(&mut store).await;
        store.clear_session();
        self.auth.lock().await.logout();
    }

    // ===== Chat flows =======================================================

    /// Create a chatroom for the signed-in user and make it current.
    ///
    /// # Errors
    /// Returns [`ChatError::NotAuthenticated`] when nobody is signed in.
    pub async fn new_chat(&self) -> ChatResult<Chatroom> {
        let mut store = self.store.lock().await;
        let user_id = self
            .current_user()
            .await
            .map(|user| user.id)
            .ok_or(ChatError::NotAuthenticated)?;

        let chatroom = Chatroom::new(user_id);
        store.add_chatroom(chatroom.clone());
        store.set_current_chatroom(Some(chatroom.id.clone()));
        info!(chatroom_id = %chatroom.id, "Started new chat");
        Ok(chatroom)
    }

    /// Send a user message to the current chatroom and schedule the reply.
    ///
    /// The text is trimmed. An untitled chatroom takes its title from the
    /// first non-blank text sent to it.
    ///
    /// # Errors
    /// Returns [`ChatError::EmptyMessage`] for blank text without an image,
    /// [`ChatError::NotAuthenticated`] when nobody is signed in and
    /// [`ChatError::NoActiveChatroom`] when no chatroom is selected.
    pub async fn send_message(
        &self,
        content: &str,
        image: Option<String>,
    ) -> ChatResult<Message> {
        let content = content.trim();
        if content.is_empty() && image.is_none() {
            return Err(ChatError::EmptyMessage);
        }
        let mut store = self.store.lock().await;
        if self.current_user().await.is_none() {
            return Err(ChatError::NotAuthenticated);
        }

        let chatroom = store
            .current_chatroom()
            .cloned()
            .ok_or(ChatError::NoActiveChatroom)?;

        if let Some(title) = title_from_message(content).filter(|_| chatroom.is_untitled()) {
            store.update_chatroom_title(chatroom.id.as_str(), title);
        }

        let message = Message::user(chatroom.id.clone(), content, image);
        store.add_message(message.clone());
        self.responder.schedule(&mut store, chatroom.id).await;
        Ok(message)
    }

    /// Select the active chatroom, or clear the selection with `None`.
    pub async fn select_chatroom(&self, id: Option<ChatroomId>) {
        self.store.lock().await.set_current_chatroom(id);
    }

    /// Rename a chatroom; unknown ids are ignored.
    pub async fn rename_chatroom(&self, id: &str, title: impl Into<String> + Send) {
        self.store.lock().await.update_chatroom_title(id, title);
    }

    /// Delete a chatroom and abort the replies still targeting it.
    pub async fn delete_chatroom(&self, id: &str) -> bool {
        let mut store = self.store.lock().await;
        let removed = store.delete_chatroom(id);
        self.responder.cancel(&mut store, id).await;
        removed
    }

    /// Prepend a page of older history to a chatroom.
    pub async fn load_more_messages(&self, id: &str) -> usize {
        self.store.lock().await.load_more_messages(id)
    }

    /// Set the typing indicator directly.
    pub async fn set_typing(&self, is_typing: bool) {
        self.store.lock().await.set_typing(is_typing);
    }

    /// Set the sidebar search query.
    pub async fn set_search_query(&self, query: impl Into<String> + Send) {
        self.store.lock().await.set_search_query(query);
    }

    /// Flip the theme flag, returning the new value.
    pub async fn toggle_dark_mode(&self) -> bool {
        let is_dark_mode = self.store.lock().await.toggle_dark_mode();
        debug!(is_dark_mode, "Toggled theme");
        is_dark_mode
    }

    /// Whether an assistant reply is still pending for a chatroom.
    pub async fn is_reply_pending(&self, id: &str) -> bool {
        self.responder.is_pending(id).await
    }

    // ===== Projections ======================================================

    /// Chatrooms matching the search query, most recent first.
    pub async fn visible_chatrooms(&self) -> Vec<Chatroom> {
        self.read(|store| store.visible_chatrooms().into_iter().cloned().collect())
            .await
    }

    /// Messages of the current chatroom, oldest first.
    pub async fn current_messages(&self) -> Vec<Message> {
        self.read(|store| store.current_messages().to_vec()).await
    }

    /// Id of the current chatroom, if it still exists.
    pub async fn current_chatroom_id(&self) -> Option<ChatroomId> {
        self.read(|store| store.current_chatroom_id().cloned()).await
    }

    /// Whether the assistant is typing.
    pub async fn is_typing(&self) -> bool {
        self.read(ChatStore::is_typing).await
    }

    /// Whether dark mode is on.
    pub async fn is_dark_mode(&self) -> bool {
        self.read(ChatStore::is_dark_mode).await
    }
}
