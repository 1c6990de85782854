//! Configuration for the chat subsystem.

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chat::core::errors::{ChatError, ChatResult};

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Durable storage settings.
    pub storage: StorageConfig,
    /// Simulated reply settings.
    pub responder: ResponderConfig,
    /// History pagination settings.
    pub pagination: PaginationConfig,
    /// HTTP surface settings.
    pub server: ServerConfig,
}

impl ChatConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `SQLite` database path.
    #[must_use]
    pub fn with_sqlite_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.sqlite_path = path.into();
        self
    }

    /// Set the reply delay window in milliseconds.
    #[must_use]
    pub const fn with_reply_delay_ms(mut self, min_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.responder.min_delay_ms = min_delay_ms;
        self.responder.max_delay_ms = max_delay_ms;
        self
    }

    /// Set the number of messages fabricated per history page.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.pagination.page_size = page_size;
        self
    }

    /// Set the HTTP port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        let table = &self.storage.table;
        if table.is_empty() || !table.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(ChatError::InvalidConfig(format!(
                "storage.table must be a non-empty identifier, got {table:?}"
            )));
        }

        if self.storage.chat_key.is_empty() || self.storage.auth_key.is_empty() {
            return Err(ChatError::InvalidConfig(
                "storage keys must not be empty".to_string(),
            ));
        }

        if self.storage.chat_key == self.storage.auth_key {
            return Err(ChatError::InvalidConfig(
                "storage.chat_key and storage.auth_key must differ".to_string(),
            ));
        }

        if self.responder.min_delay_ms > self.responder.max_delay_ms {
            return Err(ChatError::InvalidConfig(
                "responder.min_delay_ms must be <= responder.max_delay_ms".to_string(),
            ));
        }

        if self.pagination.page_size == 0 {
            return Err(ChatError::InvalidConfig(
                "pagination.page_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Storage configuration for persisted state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Key-value table name.
    pub table: String,
    /// Key of the chat record.
    pub chat_key: String,
    /// Key of the auth record.
    pub auth_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("chatroom.sqlite"),
            table: "kv_store".to_string(),
            chat_key: "chat-state".to_string(),
            auth_key: "auth-state".to_string(),
        }
    }
}

/// Simulated reply settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Lower bound of the reply delay.
    pub min_delay_ms: u64,
    /// Upper bound of the reply delay (inclusive).
    pub max_delay_ms: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1500,
            max_delay_ms: 3500,
        }
    }
}

impl ResponderConfig {
    /// Draw a delay uniformly from the configured window.
    #[must_use]
    pub fn pick_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let low = self.min_delay_ms.min(self.max_delay_ms);
        let high = self.min_delay_ms.max(self.max_delay_ms);
        Duration::from_millis(rng.gen_range(low..=high))
    }
}

/// History pagination settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Messages fabricated per page.
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// HTTP surface settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.page_size, 20);
        assert_eq!(config.storage.chat_key, "chat-state");
    }

    #[test]
    fn test_builder_setters() {
        let config = ChatConfig::new()
            .with_sqlite_path("/tmp/x.sqlite")
            .with_reply_delay_ms(1000, 3000)
            .with_page_size(5)
            .with_port(8080);
        assert_eq!(config.storage.sqlite_path, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(config.responder.min_delay_ms, 1000);
        assert_eq!(config.pagination.page_size, 5);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let config = ChatConfig::new().with_page_size(0);
        assert!(matches!(config.validate(), Err(ChatError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_delay_window() {
        let config = ChatConfig::new().with_reply_delay_ms(4000, 1000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let mut config = ChatConfig::new();
        config.storage.table = "kv; DROP TABLE x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_shared_keys() {
        let mut config = ChatConfig::new();
        config.storage.auth_key = config.storage.chat_key.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pick_delay_within_window() {
        let config = ResponderConfig::default();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let delay = config.pick_delay(&mut rng);
            assert!(delay >= Duration::from_millis(1500));
            assert!(delay <= Duration::from_millis(3500));
        }
    }
}
