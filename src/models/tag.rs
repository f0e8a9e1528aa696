//! Tags and the fixed category map.
//!
//! A tag belongs to exactly one of three categories. Anything keyed by category is stored
//! in a [`CategoryMap`], which always holds exactly one slot per category.

use super::TagId;
use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

/// The three kinds of tag a party can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    /// People the game is played with
    Friend,
    /// Genre or free-form grouping
    Category,
    /// Play status (playing, finished, ...)
    Status,
}

impl TagCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 3] = [Self::Friend, Self::Category, Self::Status];

    /// Lowercase name used in serialized boards and settings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Category => "category",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friend" => Ok(Self::Friend),
            "category" => Ok(Self::Category),
            "status" => Ok(Self::Status),
            other => Err(Error::InvalidSetting {
                field: "category",
                value: other.to_string(),
            }),
        }
    }
}

/// One value per [`TagCategory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap<T> {
    /// Slot for [`TagCategory::Friend`]
    #[serde(default)]
    pub friend: T,
    /// Slot for [`TagCategory::Category`]
    #[serde(default)]
    pub category: T,
    /// Slot for [`TagCategory::Status`]
    #[serde(default)]
    pub status: T,
}

impl<T> CategoryMap<T> {
    /// Builds a map by calling `f` once per category.
    pub fn from_fn(mut f: impl FnMut(TagCategory) -> T) -> Self {
        Self {
            friend: f(TagCategory::Friend),
            category: f(TagCategory::Category),
            status: f(TagCategory::Status),
        }
    }

    /// Iterates `(category, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (TagCategory, &T)> {
        TagCategory::ALL.into_iter().map(move |c| (c, &self[c]))
    }

    /// Iterates values mutably in display order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        [&mut self.friend, &mut self.category, &mut self.status].into_iter()
    }
}

impl<T> Index<TagCategory> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: TagCategory) -> &T {
        match category {
            TagCategory::Friend => &self.friend,
            TagCategory::Category => &self.category,
            TagCategory::Status => &self.status,
        }
    }
}

impl<T> IndexMut<TagCategory> for CategoryMap<T> {
    fn index_mut(&mut self, category: TagCategory) -> &mut T {
        match category {
            TagCategory::Friend => &mut self.friend,
            TagCategory::Category => &mut self.category,
            TagCategory::Status => &mut self.status,
        }
    }
}

/// A named label in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Stable identifier, referenced by parties and filters
    pub id: TagId,
    /// Category this tag belongs to
    pub category: TagCategory,
    /// Display name, unique within the category (case-insensitive)
    pub name: String,
    /// Number of games with at least one party carrying this tag
    pub total_games_count: usize,
    /// Same as `total_games_count`, restricted to the currently filtered games
    pub filtered_games_count: usize,
}

impl Tag {
    /// Creates a tag with zeroed counters.
    #[must_use]
    pub const fn new(id: TagId, category: TagCategory, name: String) -> Self {
        Self {
            id,
            category,
            name,
            total_games_count: 0,
            filtered_games_count: 0,
        }
    }
}
