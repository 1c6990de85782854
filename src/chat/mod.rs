//! Conversation subsystem.
//!
//! - `core`: configuration, errors, identifiers, models and text helpers
//! - `persistence`: key-value storage and snapshot codecs
//! - `store`: the conversation store, search projection and history pagination
//! - `auth`: the authenticated user record
//! - `responder`: simulated assistant replies and the typing indicator
//! - `session`: composition root tying the pieces together

pub mod auth;
pub mod core;
pub mod persistence;
pub mod responder;
pub mod session;
pub mod store;

pub use auth::AuthStore;
pub use self::core::{
    ChatConfig, ChatError, ChatResult, Chatroom, ChatroomId, Message, MessageId,
    PaginationConfig, ResponderConfig, ServerConfig, StorageConfig, User, UserId,
};
pub use persistence::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use responder::ResponseScheduler;
pub use session::ChatSession;
pub use store::{ChatStore, SharedChatStore};
