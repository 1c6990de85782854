//! Conversation store and its read projections.

pub mod chat_store;
pub mod pagination;
pub mod search;

pub use chat_store::{ChatStore, SharedChatStore};
pub use pagination::synthesize_page;
pub use search::filter_chatrooms;
