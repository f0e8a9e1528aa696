//! Domain model - tags, games, parties and reminders.
//!
//! Every entity is referenced by a string id. Ids are generated as UUID v4 for new
//! entities, but any non-empty string read back from a board is accepted so that boards
//! written by other clients load unchanged.

/// Games, their parties and external-store linkage
pub mod game;
/// Reminders attached to games or parties
pub mod reminder;
/// Tag categories, tags and the category-keyed map
pub mod tag;

pub use game::{Game, NewGame, Party, StoreType};
pub use reminder::{MAX_REMINDER_MESSAGE_LEN, Reminder};
pub use tag::{CategoryMap, Tag, TagCategory};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrows the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Tag`]
    TagId
);
entity_id!(
    /// Identifier of a [`Game`]
    GameId
);
entity_id!(
    /// Identifier of a [`Party`]
    PartyId
);
entity_id!(
    /// Identifier of a [`Reminder`]
    ReminderId
);

/// Case-insensitive key used for every uniqueness check and name comparison.
#[must_use]
pub fn fold_case(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TagId::generate();
        let b = TagId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = GameId::from("game-1");
        assert_eq!(serde_json::to_string(&id).ok(), Some("\"game-1\"".to_string()));
    }

    #[test]
    fn test_fold_case_trims_and_lowercases() {
        assert_eq!(fold_case("  Co-Op "), "co-op");
    }
}
