//! Settings store - combination modes, sort preferences and custom tag orders.
//!
//! This is a plain configuration holder. It never sorts anything itself; the
//! [`Library`](crate::core::library::Library) watches it and rebinds the sorting reactions.

use crate::{
    errors::{Error, Result},
    models::{CategoryMap, TagCategory, TagId},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// How several selected tags of one category combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// The party must carry every selected tag
    #[default]
    And,
    /// The party must carry at least one selected tag
    Or,
}

/// How tags of one category are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagSortMethod {
    /// Alphabetic, case-insensitive
    #[default]
    Name,
    /// By number of games in the current filter result
    CountFiltered,
    /// By number of games on the whole board
    CountTotal,
    /// By a user-arranged list
    Custom,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Natural order of the method
    #[default]
    Asc,
    /// Reverse of the natural order
    Desc,
}

/// How the game grid is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameSortMethod {
    /// Alphabetic over the sorting title, falling back to the title
    #[default]
    Title,
}

macro_rules! parse_setting {
    ($ty:ty, $field:literal, { $($text:literal => $value:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($value),)+
                    other => Err(Error::InvalidSetting {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

parse_setting!(FilterMode, "filter mode", { "and" => FilterMode::And, "or" => FilterMode::Or });
parse_setting!(TagSortMethod, "tag sort method", {
    "name" => TagSortMethod::Name,
    "countFiltered" => TagSortMethod::CountFiltered,
    "countTotal" => TagSortMethod::CountTotal,
    "custom" => TagSortMethod::Custom,
});
parse_setting!(SortDirection, "sort direction", {
    "asc" => SortDirection::Asc,
    "desc" => SortDirection::Desc,
});
parse_setting!(GameSortMethod, "game sort method", { "title" => GameSortMethod::Title });

/// Sort preference of one tag category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSort {
    /// Comparator to use
    pub method: TagSortMethod,
    /// Direction applied on top of the comparator
    pub direction: SortDirection,
}

/// Persisted user preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// AND/OR per category
    #[serde(default)]
    pub filter_modes: CategoryMap<FilterMode>,
    /// Tag ordering per category
    #[serde(default)]
    pub tag_sort: CategoryMap<TagSort>,
    /// Game grid ordering
    #[serde(default)]
    pub game_sort_method: GameSortMethod,
    /// Game grid direction
    #[serde(default)]
    pub game_sort_direction: SortDirection,
}

/// Holds [`Settings`] plus the custom tag order lists.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    settings: Settings,
    custom_order: CategoryMap<Vec<TagId>>,
    revision: u64,
}

impl SettingsStore {
    /// Creates a store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from persisted values.
    #[must_use]
    pub fn with_settings(settings: Settings, custom_order: CategoryMap<Vec<TagId>>) -> Self {
        Self {
            settings,
            custom_order,
            revision: 0,
        }
    }

    /// Bumped on every accepted change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Combination modes of every category.
    #[must_use]
    pub const fn filter_modes(&self) -> &CategoryMap<FilterMode> {
        &self.settings.filter_modes
    }

    /// Tag sort preference of a category.
    #[must_use]
    pub fn tag_sort(&self, category: TagCategory) -> TagSort {
        self.settings.tag_sort[category]
    }

    /// Custom order of a category, possibly empty.
    #[must_use]
    pub fn custom_order(&self, category: TagCategory) -> &[TagId] {
        &self.custom_order[category]
    }

    /// All custom orders, for persistence.
    #[must_use]
    pub const fn custom_orders(&self) -> &CategoryMap<Vec<TagId>> {
        &self.custom_order
    }

    /// Sets the combination mode of a category.
    pub fn set_filter_mode(&mut self, category: TagCategory, mode: FilterMode) {
        if self.settings.filter_modes[category] != mode {
            self.settings.filter_modes[category] = mode;
            self.revision += 1;
        }
    }

    /// Sets the tag sort method of a category.
    pub fn set_tag_sort_method(&mut self, category: TagCategory, method: TagSortMethod) {
        if self.settings.tag_sort[category].method != method {
            self.settings.tag_sort[category].method = method;
            self.revision += 1;
        }
    }

    /// Sets the tag sort direction of a category.
    pub fn set_tag_sort_direction(&mut self, category: TagCategory, direction: SortDirection) {
        if self.settings.tag_sort[category].direction != direction {
            self.settings.tag_sort[category].direction = direction;
            self.revision += 1;
        }
    }

    /// Sets the game grid ordering.
    pub fn set_game_sort(&mut self, method: GameSortMethod, direction: SortDirection) {
        if self.settings.game_sort_method != method
            || self.settings.game_sort_direction != direction
        {
            self.settings.game_sort_method = method;
            self.settings.game_sort_direction = direction;
            self.revision += 1;
        }
    }

    /// Applies a textual option from the UI, e.g. `("tagSortMethod", Some(Friend), "custom")`.
    ///
    /// Unknown fields or values are logged and rejected; the settings stay unchanged.
    pub fn apply_option(
        &mut self,
        field: &str,
        category: Option<TagCategory>,
        value: &str,
    ) -> Result<()> {
        let outcome = match (field, category) {
            ("filterMode", Some(c)) => {
                value.parse::<FilterMode>().map(|m| self.set_filter_mode(c, m))
            }
            ("tagSortMethod", Some(c)) => value
                .parse::<TagSortMethod>()
                .map(|m| self.set_tag_sort_method(c, m)),
            ("tagSortDirection", Some(c)) => {
                value.parse::<SortDirection>().map(|d| self.set_tag_sort_direction(c, d))
            }
            ("gameSortMethod", None) => value.parse::<GameSortMethod>().map(|m| {
                let direction = self.settings.game_sort_direction;
                self.set_game_sort(m, direction);
            }),
            ("gameSortDirection", None) => value.parse::<SortDirection>().map(|d| {
                let method = self.settings.game_sort_method;
                self.set_game_sort(method, d);
            }),
            _ => Err(Error::InvalidSetting {
                field: "setting",
                value: field.to_string(),
            }),
        };
        if let Err(e) = &outcome {
            warn!("Rejected setting change {} = '{}': {}", field, value, e);
        }
        outcome
    }

    /// Replaces the custom order of a category.
    pub fn set_custom_order(&mut self, category: TagCategory, order: Vec<TagId>) {
        self.custom_order[category] = order;
        self.revision += 1;
    }

    /// Appends a new tag to a non-empty custom order so it keeps its position.
    pub fn append_to_custom_order(&mut self, category: TagCategory, tag_id: &TagId) {
        if !self.custom_order[category].is_empty() && !self.custom_order[category].contains(tag_id)
        {
            self.custom_order[category].push(tag_id.clone());
            self.revision += 1;
        }
    }

    /// Removes a deleted tag from every custom order.
    pub fn remove_from_custom_order(&mut self, tag_id: &TagId) {
        for order in self.custom_order.values_mut() {
            order.retain(|id| id != tag_id);
        }
        self.revision += 1;
    }
}
