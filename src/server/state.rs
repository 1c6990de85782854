//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::chat::{ChatConfig, ChatResult, ChatSession};

/// Shared application state.
pub struct AppState {
    /// The device's chat session.
    pub session: ChatSession,
}

impl AppState {
    /// Create the state over the configured `SQLite` storage.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or storage cannot be
    /// opened.
    pub fn new(config: &ChatConfig) -> ChatResult<Arc<Self>> {
        let session = ChatSession::open(config)?;
        Ok(Arc::new(Self { session }))
    }

    /// Create the state with volatile storage.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn in_memory(config: &ChatConfig) -> ChatResult<Arc<Self>> {
        let session = ChatSession::in_memory(config)?;
        Ok(Arc::new(Self { session }))
    }
}
