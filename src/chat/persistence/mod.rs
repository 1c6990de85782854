//! Durable storage for chat and auth state.

pub mod kv_store;
pub mod snapshot;

pub use kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use snapshot::{AuthSnapshot, ChatSnapshot, ChatSnapshotView, SNAPSHOT_VERSION};
