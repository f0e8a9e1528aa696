//! Unified error types for the game board.
//!
//! Validation failures are returned as values from every store mutation; nothing in the
//! public API panics or throws across a store boundary.

use crate::models::TagCategory;
use thiserror::Error;

/// All errors produced by the stores, the board codec and the local cache.
#[derive(Debug, Error)]
pub enum Error {
    /// A tag name was blank after trimming
    #[error("Tag name cannot be empty")]
    InvalidName,

    /// A game was submitted without a title
    #[error("Game title cannot be empty")]
    MissingTitle,

    /// A game was submitted without a cover image
    #[error("Game cover image cannot be empty")]
    MissingCover,

    /// Another tag in the same category already uses this name
    #[error("A {category} tag named '{name}' already exists")]
    DuplicateName {
        /// Category the collision happened in
        category: TagCategory,
        /// The rejected name
        name: String,
    },

    /// Another game already uses this title
    #[error("A game titled '{title}' already exists")]
    DuplicateTitle {
        /// The rejected title
        title: String,
    },

    /// The external store game was already imported
    #[error("Game {store_id} from {store_type} is already on the board")]
    DuplicateExternalId {
        /// Store the game comes from
        store_type: String,
        /// Identifier within that store
        store_id: String,
    },

    /// A non-custom store type was given without a store id
    #[error("Games from {store_type} need a store id")]
    MissingExternalId {
        /// Store that requires the id
        store_type: String,
    },

    /// A referenced entity is no longer present
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Entity kind ("tag", "game", "party", "reminder")
        kind: &'static str,
        /// The stale id
        id: String,
    },

    /// The filter or party tag state would become inconsistent
    #[error("Invalid tag state: {message}")]
    InvalidTagState {
        /// What was wrong
        message: String,
    },

    /// Attempted to delete the only party of a game
    #[error("Game '{game_id}' must keep at least one party")]
    LastParty {
        /// The game whose last party was targeted
        game_id: String,
    },

    /// Reminder date or message failed validation
    #[error("Invalid reminder: {message}")]
    InvalidReminder {
        /// What was wrong
        message: String,
    },

    /// A settings value was not one of the known options
    #[error("Invalid setting {field}: '{value}'")]
    InvalidSetting {
        /// Setting that was being changed
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// Persisted or imported board data failed shape validation
    #[error("Malformed board data: {message}")]
    MalformedImport {
        /// What was wrong
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Local cache database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Board JSON could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system error during export or import
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] on the given kind and id.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
