//! Core chat types and identifiers.

pub mod config;
pub mod errors;
pub mod ids;
pub mod models;
pub mod text;
pub mod time;

pub use config::{ChatConfig, PaginationConfig, ResponderConfig, ServerConfig, StorageConfig};
pub use errors::{ChatError, ChatResult};
pub use ids::{ChatroomId, MessageId, UserId, generate_id};
pub use models::{Chatroom, DEFAULT_CHATROOM_TITLE, Message, User};
