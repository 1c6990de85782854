//! Deferred assistant replies.
//!
//! Each send schedules one fire-and-forget tokio task that sleeps for a random
//! delay, appends a canned reply to the originating chatroom and then lowers
//! the typing indicator. Tasks are registered per chatroom so deleting a
//! chatroom (or logging out) aborts the replies still targeting it.
//!
//! The store keeps a single typing flag; it is only lowered once no reply is
//! pending in any chatroom. Lock order is always store, then pending registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::chat::core::config::ResponderConfig;
use crate::chat::core::ids::ChatroomId;
use crate::chat::core::models::Message;
use crate::chat::responder::corpus::pick_reply;
use crate::chat::store::chat_store::{ChatStore, SharedChatStore};

/// Replies waiting for their delay to elapse, by chatroom.
#[derive(Debug, Default)]
struct PendingReplies {
    by_chatroom: HashMap<ChatroomId, Vec<(u64, AbortHandle)>>,
}

impl PendingReplies {
    fn register(&mut self, chatroom_id: ChatroomId, token: u64, handle: AbortHandle) {
        self.by_chatroom
            .entry(chatroom_id)
            .or_default()
            .push((token, handle));
    }

    fn complete(&mut self, chatroom_id: &str, token: u64) {
        if let Some(replies) = self.by_chatroom.get_mut(chatroom_id) {
            replies.retain(|(pending, _)| *pending != token);
            if replies.is_empty() {
                self.by_chatroom.remove(chatroom_id);
            }
        }
    }

    fn cancel(&mut self, chatroom_id: &str) -> usize {
        self.by_chatroom
            .remove(chatroom_id)
            .map_or(0, |replies| abort_all(&replies))
    }

    fn cancel_all(&mut self) -> usize {
        self.by_chatroom
            .drain()
            .map(|(_, replies)| abort_all(&replies))
            .sum()
    }

    fn is_empty(&self) -> bool {
        self.by_chatroom.is_empty()
    }

    fn contains(&self, chatroom_id: &str) -> bool {
        self.by_chatroom.contains_key(chatroom_id)
    }
}

fn abort_all(replies: &[(u64, AbortHandle)]) -> usize {
    for (_, handle) in replies {
        handle.abort();
    }
    replies.len()
}

/// Schedules simulated assistant replies against the shared store.
pub struct ResponseScheduler {
    store: SharedChatStore,
    config: ResponderConfig,
    pending: Arc<Mutex<PendingReplies>>,
    next_token: AtomicU64,
}

impl ResponseScheduler {
    /// Create a scheduler writing into `store`.
    #[must_use]
    pub fn new(store: SharedChatStore, config: ResponderConfig) -> Self {
        Self {
            store,
            config,
            pending: Arc::new(Mutex::new(PendingReplies::default())),
            next_token: AtomicU64::new(0),
        }
    }

    /// Raise the typing indicator and schedule one reply into `chatroom_id`.
    ///
    /// `store` is the caller's guard on the same shared store; the reply task
    /// cannot run before the caller releases it. Returns the chosen delay.
    pub async fn schedule(&self, store: &mut ChatStore, chatroom_id: ChatroomId) -> Duration {
        store.set_typing(true);

        let delay = self.config.pick_delay(&mut rand::thread_rng());
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.pending.lock().await;

        let task = tokio::spawn(deliver_reply(
            Arc::clone(&self.store),
            Arc::clone(&self.pending),
            chatroom_id.clone(),
            token,
            delay,
        ));

        debug!(%chatroom_id, delay_ms = delay.as_millis(), "Scheduled assistant reply");
        pending.register(chatroom_id, token, task.abort_handle());
        delay
    }

    /// Abort the replies pending for a chatroom.
    ///
    /// `store` is the caller's guard on the same shared store.
    pub async fn cancel(&self, store: &mut ChatStore, chatroom_id: &str) -> usize {
        let mut pending = self.pending.lock().await;
        let cancelled = pending.cancel(chatroom_id);
        if cancelled > 0 {
            info!(chatroom_id, cancelled, "Cancelled pending assistant replies");
            store.set_typing(!pending.is_empty());
        }
        cancelled
    }

    /// Abort every pending reply.
    ///
    /// `store` is the caller's guard on the same shared store.
    pub async fn cancel_all(&self, store: &mut ChatStore) -> usize {
        let mut pending = self.pending.lock().await;
        let cancelled = pending.cancel_all();
        if cancelled > 0 {
            info!(cancelled, "Cancelled all pending assistant replies");
            store.set_typing(false);
        }
        cancelled
    }

    /// Whether a reply is still pending for a chatroom.
    pub async fn is_pending(&self, chatroom_id: &str) -> bool {
        self.pending.lock().await.contains(chatroom_id)
    }
}

async fn deliver_reply(
    store: SharedChatStore,
    pending: Arc<Mutex<PendingReplies>>,
    chatroom_id: ChatroomId,
    token: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let mut store = store.lock().await;
    let mut pending = pending.lock().await;
    pending.complete(chatroom_id.as_str(), token);

    if store.chatroom(chatroom_id.as_str()).is_some() {
        let reply = Message::assistant(chatroom_id.clone(), pick_reply(&mut rand::thread_rng()));
        store.add_message(reply);
        debug!(%chatroom_id, "Delivered assistant reply");
    } else {
        debug!(%chatroom_id, "Reply target vanished, dropping reply");
    }

    store.set_typing(!pending.is_empty());
}
