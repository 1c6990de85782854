//! Identifier types for users, chatrooms and messages.
//!
//! Identifiers are opaque strings wrapped in typed newtypes. Generated values
//! come from a time-ordered `UUIDv7`: a millisecond timestamp followed by
//! random bits, which keeps them unique for the lifetime of the process
//! without any coordination. Caller-supplied strings (including ids restored
//! from older sessions) are accepted as-is.

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh identifier string.
#[inline]
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Declare a string-backed identifier newtype with a consistent API.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(String);

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Generate a new unique identifier.
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(generate_id())
            }

            /// Borrow as `&str`.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into `String`.
            #[inline]
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // Lets maps keyed by the newtype be queried with a plain `&str`.
        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from(s))
            }
        }
    };
}

define_string_id!(
    /// Identifier of an authenticated user, stamped on the chatrooms they own.
    UserId
);

define_string_id!(
    /// Identifier of a chatroom; also keys its message list.
    ChatroomId
);

define_string_id!(
    /// Identifier of a single message.
    MessageId
);

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_caller_supplied_id_is_kept_verbatim() {
        let id = ChatroomId::from("c1");
        assert_eq!(id.as_str(), "c1");
        assert_eq!(id.to_string(), "c1");
        assert_eq!("c1".parse::<ChatroomId>().unwrap(), id);
    }

    #[test]
    fn test_map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(ChatroomId::from("c1"), 1_u8);
        assert_eq!(map.get("c1"), Some(&1));
        assert!(map.get("c2").is_none());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = MessageId::from("m1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");
        let restored: MessageId = serde_json::from_str("\"m1\"").unwrap();
        assert_eq!(restored, id);
    }
}
