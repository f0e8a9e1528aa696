//! Games and parties.
//!
//! A game owns an ordered, non-empty list of parties. Each party is one group or
//! playthrough and carries its own tag references per category.

use super::{CategoryMap, GameId, PartyId, TagCategory, TagId};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

/// Name given to the party every new game starts with.
pub const DEFAULT_PARTY_NAME: &str = "Default";

/// Where a game was imported from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    /// Entered by hand, no external linkage
    #[default]
    Custom,
    /// Imported from a Steam library
    Steam,
}

impl StoreType {
    /// Whether games of this type must carry a store id.
    #[must_use]
    pub const fn is_external(self) -> bool {
        !matches!(self, Self::Custom)
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => f.write_str("custom"),
            Self::Steam => f.write_str("steam"),
        }
    }
}

/// One group or playthrough of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    /// Stable identifier
    pub id: PartyId,
    /// Display name
    pub name: String,
    /// Free-text note, editable without validation
    pub note: String,
    /// Tags referenced by this party, per category
    pub tag_ids: CategoryMap<BTreeSet<TagId>>,
}

impl Party {
    /// Creates an empty party with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PartyId::generate(),
            name: name.into(),
            note: String::new(),
            tag_ids: CategoryMap::default(),
        }
    }

    /// Whether the party references `tag_id` in any category.
    #[must_use]
    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tag_ids.iter().any(|(_, ids)| ids.contains(tag_id))
    }

    /// Tag ids of one category.
    #[must_use]
    pub fn tags(&self, category: TagCategory) -> &BTreeSet<TagId> {
        &self.tag_ids[category]
    }
}

/// A game on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Stable identifier
    pub id: GameId,
    /// Display title, unique case-insensitively
    pub title: String,
    /// Optional override used for alphabetic sorting
    pub sorting_title: Option<String>,
    /// Cover image reference (URL or path)
    pub cover_image_url: String,
    /// Store the game was imported from
    pub store_type: StoreType,
    /// Identifier inside `store_type`; required when the store is external
    pub store_id: Option<String>,
    /// Optional `SteamGridDB` game id for artwork lookups
    pub sgdb_id: Option<u64>,
    /// Parties in display order, never empty
    pub parties: Vec<Party>,
}

impl Game {
    /// Key used when sorting games alphabetically.
    #[must_use]
    pub fn sort_key(&self) -> String {
        self.sorting_title
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.title)
            .to_lowercase()
    }

    /// Whether any party of this game references `tag_id`.
    #[must_use]
    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.parties.iter().any(|party| party.has_tag(tag_id))
    }

    /// Finds a party by id.
    #[must_use]
    pub fn party(&self, party_id: &PartyId) -> Option<&Party> {
        self.parties.iter().find(|p| &p.id == party_id)
    }

    /// Finds a party by id, mutably.
    pub fn party_mut(&mut self, party_id: &PartyId) -> Option<&mut Party> {
        self.parties.iter_mut().find(|p| &p.id == party_id)
    }
}

/// Input for creating or editing a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGame {
    /// Display title
    pub title: String,
    /// Cover image reference
    pub cover_image_url: String,
    /// Optional alphabetic sort override
    pub sorting_title: Option<String>,
    /// Store the game comes from
    pub store_type: StoreType,
    /// Identifier inside the store
    pub store_id: Option<String>,
    /// Optional `SteamGridDB` id
    pub sgdb_id: Option<u64>,
}

impl NewGame {
    /// A custom game with only a title and cover.
    #[must_use]
    pub fn custom(title: impl Into<String>, cover_image_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cover_image_url: cover_image_url.into(),
            ..Self::default()
        }
    }

    /// A game linked to an external store.
    #[must_use]
    pub fn from_store(
        title: impl Into<String>,
        cover_image_url: impl Into<String>,
        store_type: StoreType,
        store_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            cover_image_url: cover_image_url.into(),
            store_type,
            store_id: Some(store_id.into()),
            ..Self::default()
        }
    }
}
