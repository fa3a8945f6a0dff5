//! Type-safe identifiers for Solace entities.
//!
//! Runtime entities (tokens, containers) use UUID v7 wrappers so the
//! compiler prevents mixing identifiers. Sessions are identified by a
//! zero-padded numeric string ([`SessionId`]) because session ids are
//! user-visible, user-editable, and persisted as plain strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a released token.
    TokenId
}

define_id! {
    /// Unique identifier for a session grouping container.
    ContainerId
}

/// Width of the zero-padded numeric portion of a session id.
const SESSION_ID_DIGITS: usize = 3;

/// A session identifier: a zero-padded numeric string such as `"001"`.
///
/// Session ids are generated monotonically by incrementing the trailing
/// integer of the previous id. Ids that carry no trailing integer restart
/// numbering at [`SessionId::first`]. The string form is what users see,
/// what tokens are stamped with, and what the save file stores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// The initial session id, `"001"`.
    pub fn first() -> Self {
        Self(format!("{:0>width$}", 1, width = SESSION_ID_DIGITS))
    }

    /// Generate the next session id in sequence.
    ///
    /// Parses the trailing integer of this id and increments it,
    /// zero-padding to three digits (`"001"` -> `"002"`, `"009"` ->
    /// `"010"`). An id with no trailing integer, or one whose numeric
    /// value cannot be represented, restarts the sequence at `"001"`.
    pub fn successor(&self) -> Self {
        let digits: String = self
            .0
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        digits
            .parse::<u32>()
            .ok()
            .and_then(|n| n.checked_add(1))
            .map_or_else(Self::first, |next| {
                Self(format!("{next:0>width$}", width = SESSION_ID_DIGITS))
            })
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::first()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let token = TokenId::new();
        let container = ContainerId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(token.into_inner(), Uuid::nil());
        assert_ne!(container.into_inner(), Uuid::nil());
    }

    #[test]
    fn first_session_id_is_001() {
        assert_eq!(SessionId::first().as_str(), "001");
    }

    #[test]
    fn successor_increments_and_pads() {
        assert_eq!(SessionId::from("001").successor().as_str(), "002");
        assert_eq!(SessionId::from("009").successor().as_str(), "010");
        assert_eq!(SessionId::from("099").successor().as_str(), "100");
    }

    #[test]
    fn successor_past_three_digits_keeps_counting() {
        assert_eq!(SessionId::from("999").successor().as_str(), "1000");
    }

    #[test]
    fn non_numeric_id_restarts_at_001() {
        assert_eq!(SessionId::from("garden").successor().as_str(), "001");
        assert_eq!(SessionId::from("").successor().as_str(), "001");
    }

    #[test]
    fn trailing_integer_is_what_counts() {
        assert_eq!(SessionId::from("run-7").successor().as_str(), "008");
    }

    #[test]
    fn session_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::from("002")).ok();
        assert_eq!(json.as_deref(), Some("\"002\""));
    }
}
