//! Auth record persisted under its own key.
//!
//! The login flow itself lives outside this crate; this store only keeps the
//! resulting user so chatrooms can be stamped with its id.

use tracing::{info, warn};

use crate::chat::core::config::StorageConfig;
use crate::chat::core::models::User;
use crate::chat::persistence::kv_store::{KeyValueStore, MemoryKeyValueStore};
use crate::chat::persistence::snapshot::AuthSnapshot;

/// Holds the authenticated user and mirrors it to storage.
pub struct AuthStore {
    user: Option<User>,
    storage: Box<dyn KeyValueStore>,
    storage_key: String,
}

impl AuthStore {
    /// Restore the user from `storage`; never fails.
    #[must_use]
    pub fn load(storage: Box<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let snapshot = match storage.get(&storage_key) {
            Ok(Some(raw)) => AuthSnapshot::decode(&raw),
            Ok(None) => AuthSnapshot::default(),
            Err(err) => {
                warn!(%err, key = %storage_key, "Failed to read auth state, starting logged out");
                AuthSnapshot::default()
            }
        };

        Self {
            user: snapshot.user,
            storage,
            storage_key,
        }
    }

    /// Logged-out store backed by volatile memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(
            Box::new(MemoryKeyValueStore::new()),
            StorageConfig::default().auth_key,
        )
    }

    fn persist(&self) {
        let snapshot = AuthSnapshot {
            user: self.user.clone(),
        };
        let written = snapshot
            .encode()
            .and_then(|raw| self.storage.set(&self.storage_key, &raw));
        if let Err(err) = written {
            warn!(%err, key = %self.storage_key, "Failed to persist auth state");
        }
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref().filter(|user| user.is_authenticated)
    }

    /// Replace the current user.
    pub fn set_user(&mut self, user: Option<User>) {
        if let Some(user) = &user {
            info!(user_id = %user.id, "User signed in");
        }
        self.user = user;
        self.persist();
    }

    /// Forget the current user.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "User signed out");
        }
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "auth-state";

    #[test]
    fn test_starts_logged_out() {
        let auth = AuthStore::in_memory();
        assert!(auth.user().is_none());
    }

    #[test]
    fn test_user_survives_reload() {
        let backing = MemoryKeyValueStore::new();
        let mut auth = AuthStore::load(Box::new(backing.clone()), KEY);
        let user = User::new("5550100", "+44");
        auth.set_user(Some(user.clone()));
        drop(auth);

        let reloaded = AuthStore::load(Box::new(backing), KEY);
        assert_eq!(reloaded.user(), Some(&user));
    }

    #[test]
    fn test_logout_persists_null_user() {
        let backing = MemoryKeyValueStore::new();
        let mut auth = AuthStore::load(Box::new(backing.clone()), KEY);
        auth.set_user(Some(User::new("5550100", "+44")));
        auth.logout();
        assert!(auth.user().is_none());

        let raw = backing.get(KEY).unwrap().unwrap();
        assert!(raw.contains("\"user\":null"));
        assert!(AuthStore::load(Box::new(backing), KEY).user().is_none());
    }

    #[test]
    fn test_unauthenticated_record_does_not_count() {
        let mut auth = AuthStore::in_memory();
        let mut user = User::new("5550100", "+44");
        user.is_authenticated = false;
        auth.set_user(Some(user));
        assert!(auth.user().is_none());
    }
}
