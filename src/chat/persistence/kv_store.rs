//! Key-value storage backing the persisted records.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::{Connection, OptionalExtension};

use crate::chat::core::config::StorageConfig;
use crate::chat::core::errors::ChatResult;
use crate::chat::core::time::now_millis;

/// Durable string storage addressed by fixed keys.
///
/// Each write replaces the previous value wholesale.
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn get(&self, key: &str) -> ChatResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn set(&self, key: &str, value: &str) -> ChatResult<()>;
}

/// `SQLite` implementation of key-value storage.
pub struct SqliteKeyValueStore {
    conn: Connection,
    table: String,
}

impl SqliteKeyValueStore {
    /// Open the database file and create the table if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(config: &StorageConfig) -> ChatResult<Self> {
        let parent = config
            .sqlite_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&config.sqlite_path)?;
        Self::with_connection(conn, &config.table)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the table cannot be created.
    pub fn open_in_memory(table: &str) -> ChatResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    fn with_connection(conn: Connection, table: &str) -> ChatResult<Self> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )"
        ))?;

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> ChatResult<Option<String>> {
        let table = &self.table;
        let value = self
            .conn
            .query_row(
                &format!("SELECT value FROM {table} WHERE key = ?1"),
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> ChatResult<()> {
        let table = &self.table;
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {table} (key, value, updated_at)
                 VALUES (?1, ?2, ?3)"
            ),
            rusqlite::params![key, value, now_millis().timestamp_millis()],
        )?;
        Ok(())
    }
}

/// In-memory key-value storage.
///
/// Clones share the same entries, so a clone can stand in for "the same disk"
/// when a store is reopened.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> ChatResult<Option<String>> {
        Ok(self.with_entries(|entries| entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> ChatResult<()> {
        self.with_entries(|entries| entries.insert(key.to_string(), value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("one"));
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn test_memory_store_contract() {
        exercise(&MemoryKeyValueStore::new());
    }

    #[test]
    fn test_sqlite_store_contract() {
        exercise(&SqliteKeyValueStore::open_in_memory("kv_store").unwrap());
    }

    #[test]
    fn test_memory_clones_share_entries() {
        let first = MemoryKeyValueStore::new();
        let second = first.clone();
        first.set("k", "v").unwrap();
        assert_eq!(second.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_sqlite_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            sqlite_path: dir.path().join("nested").join("state.sqlite"),
            ..StorageConfig::default()
        };

        let store = SqliteKeyValueStore::open(&config).unwrap();
        store.set("chat-state", "{}").unwrap();
        drop(store);

        let reopened = SqliteKeyValueStore::open(&config).unwrap();
        assert_eq!(reopened.get("chat-state").unwrap().as_deref(), Some("{}"));
    }
}
