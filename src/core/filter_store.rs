//! Filter store - the user's current filter intent and the filter predicate.
//!
//! The store only holds tag ids. Whether an id still names a tag is checked by the
//! [`Library`](crate::core::library::Library) before it reaches this store, and deleted
//! tags are purged through [`FilterStore::forget_tag`].

use crate::{
    core::settings_store::FilterMode,
    models::{CategoryMap, Game, GameId, Party, TagCategory, TagId},
};
use std::collections::BTreeSet;
use tracing::debug;

/// Search text and per-category selected/excluded tag ids.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    search: String,
    selected: CategoryMap<BTreeSet<TagId>>,
    excluded: CategoryMap<BTreeSet<TagId>>,
    revision: u64,
}

impl FilterStore {
    /// Creates a store with no active filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped whenever the filter state changes.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replaces the search text.
    ///
    /// The text is stored as typed. Matching ignores surrounding whitespace, so a blank
    /// search does not count as an active filter.
    pub fn set_search(&mut self, search: &str) {
        if self.search != search {
            self.search = search.to_string();
            self.revision += 1;
        }
    }

    /// Selected ids of a category.
    #[must_use]
    pub fn selected(&self, category: TagCategory) -> &BTreeSet<TagId> {
        &self.selected[category]
    }

    /// Excluded ids of a category.
    #[must_use]
    pub fn excluded(&self, category: TagCategory) -> &BTreeSet<TagId> {
        &self.excluded[category]
    }

    /// Flips selection of a tag. Selecting clears an existing exclusion.
    ///
    /// Returns whether the tag is selected afterwards.
    pub fn toggle_selection(&mut self, category: TagCategory, tag_id: &TagId) -> bool {
        self.revision += 1;
        if self.selected[category].remove(tag_id) {
            return false;
        }
        self.excluded[category].remove(tag_id);
        self.selected[category].insert(tag_id.clone());
        true
    }

    /// Flips exclusion of a tag. Excluding clears an existing selection.
    ///
    /// Returns whether the tag is excluded afterwards.
    pub fn toggle_exclusion(&mut self, category: TagCategory, tag_id: &TagId) -> bool {
        self.revision += 1;
        if self.excluded[category].remove(tag_id) {
            return false;
        }
        self.selected[category].remove(tag_id);
        self.excluded[category].insert(tag_id.clone());
        true
    }

    /// Drops every selection and exclusion of one category.
    pub fn clear_category(&mut self, category: TagCategory) {
        self.selected[category].clear();
        self.excluded[category].clear();
        self.revision += 1;
    }

    /// Resets search, selections and exclusions.
    pub fn clear_all(&mut self) {
        self.search.clear();
        for set in self.selected.values_mut().chain(self.excluded.values_mut()) {
            set.clear();
        }
        self.revision += 1;
    }

    /// Removes a deleted tag from every set. Returns whether it was referenced.
    pub fn forget_tag(&mut self, tag_id: &TagId) -> bool {
        let mut found = false;
        for set in self.selected.values_mut().chain(self.excluded.values_mut()) {
            found |= set.remove(tag_id);
        }
        if found {
            debug!("Purged deleted tag {} from filters", tag_id);
            self.revision += 1;
        }
        found
    }

    /// Whether any filter would hide a game.
    #[must_use]
    pub fn are_filters_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self
                .selected
                .iter()
                .chain(self.excluded.iter())
                .any(|(_, set)| !set.is_empty())
    }

    /// Tag-level predicate for one party. Every category must pass.
    #[must_use]
    pub fn party_passes_filters(&self, party: &Party, modes: &CategoryMap<FilterMode>) -> bool {
        TagCategory::ALL.into_iter().all(|category| {
            let tags = party.tags(category);
            if !tags.is_disjoint(&self.excluded[category]) {
                return false;
            }
            let selected = &self.selected[category];
            if selected.is_empty() {
                return true;
            }
            match modes[category] {
                FilterMode::And => selected.is_subset(tags),
                FilterMode::Or => !selected.is_disjoint(tags),
            }
        })
    }

    /// Full predicate: search text, then at least one passing party.
    #[must_use]
    pub fn game_passes_filters(&self, game: &Game, modes: &CategoryMap<FilterMode>) -> bool {
        let search = self.search.trim();
        if !search.is_empty() && !game.title.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }
        game.parties
            .iter()
            .any(|party| self.party_passes_filters(party, modes))
    }

    /// Ids of the games that pass, in the order given.
    #[must_use]
    pub fn filter_games(&self, games: &[Game], modes: &CategoryMap<FilterMode>) -> Vec<GameId> {
        if !self.are_filters_active() {
            return games.iter().map(|g| g.id.clone()).collect();
        }
        games
            .iter()
            .filter(|g| self.game_passes_filters(g, modes))
            .map(|g| g.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoreType, game::DEFAULT_PARTY_NAME};

    fn tag(id: &str) -> TagId {
        TagId::from(id)
    }

    fn party_with(category: TagCategory, ids: &[&str]) -> Party {
        let mut party = Party::new(DEFAULT_PARTY_NAME);
        party.tag_ids[category] = ids.iter().map(|id| tag(id)).collect();
        party
    }

    fn game_with(title: &str, parties: Vec<Party>) -> Game {
        Game {
            id: GameId::from(title),
            title: title.to_string(),
            sorting_title: None,
            cover_image_url: "/c.png".to_string(),
            store_type: StoreType::Custom,
            store_id: None,
            sgdb_id: None,
            parties,
        }
    }

    fn modes(mode: FilterMode) -> CategoryMap<FilterMode> {
        CategoryMap::from_fn(|_| mode)
    }

    #[test]
    fn test_and_mode_requires_every_selected_tag() {
        let mut filters = FilterStore::new();
        filters.toggle_selection(TagCategory::Category, &tag("a"));
        filters.toggle_selection(TagCategory::Category, &tag("b"));
        let and = modes(FilterMode::And);

        assert!(!filters.party_passes_filters(&party_with(TagCategory::Category, &["a"]), &and));
        assert!(filters.party_passes_filters(
            &party_with(TagCategory::Category, &["a", "b", "c"]),
            &and
        ));
    }

    #[test]
    fn test_or_mode_requires_any_selected_tag() {
        let mut filters = FilterStore::new();
        filters.toggle_selection(TagCategory::Category, &tag("a"));
        filters.toggle_selection(TagCategory::Category, &tag("b"));
        let or = modes(FilterMode::Or);

        assert!(filters.party_passes_filters(&party_with(TagCategory::Category, &["a"]), &or));
        assert!(!filters.party_passes_filters(&party_with(TagCategory::Category, &[]), &or));
    }

    #[test]
    fn test_exclusion_always_wins() {
        let mut filters = FilterStore::new();
        filters.toggle_selection(TagCategory::Friend, &tag("a"));
        filters.toggle_exclusion(TagCategory::Friend, &tag("x"));
        let party = party_with(TagCategory::Friend, &["a", "x"]);

        for mode in [FilterMode::And, FilterMode::Or] {
            assert!(!filters.party_passes_filters(&party, &modes(mode)));
        }
    }

    #[test]
    fn test_toggle_exclusion_clears_selection() {
        let mut filters = FilterStore::new();
        let t = tag("t");
        assert!(filters.toggle_selection(TagCategory::Status, &t));
        assert!(filters.toggle_exclusion(TagCategory::Status, &t));
        assert!(filters.excluded(TagCategory::Status).contains(&t));
        assert!(!filters.selected(TagCategory::Status).contains(&t));

        // Selecting again moves it back
        assert!(filters.toggle_selection(TagCategory::Status, &t));
        assert!(!filters.excluded(TagCategory::Status).contains(&t));

        // Toggling the current state clears it
        assert!(!filters.toggle_selection(TagCategory::Status, &t));
        assert!(!filters.are_filters_active());
    }

    #[test]
    fn test_any_party_can_match() {
        let mut filters = FilterStore::new();
        filters.toggle_selection(TagCategory::Friend, &tag("b"));
        let game = game_with(
            "Hades",
            vec![
                party_with(TagCategory::Friend, &["a"]),
                party_with(TagCategory::Friend, &["b"]),
            ],
        );
        assert!(filters.game_passes_filters(&game, &modes(FilterMode::Or)));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut filters = FilterStore::new();
        filters.set_search("ADE");
        let games = vec![
            game_with("Hades", vec![Party::new("p")]),
            game_with("Celeste", vec![Party::new("p")]),
        ];
        assert_eq!(
            filters.filter_games(&games, &modes(FilterMode::And)),
            vec![GameId::from("Hades")]
        );
    }

    #[test]
    fn test_search_ignores_surrounding_whitespace() {
        let mut filters = FilterStore::new();
        let games = vec![
            game_with("Hades", vec![Party::new("p")]),
            game_with("Celeste", vec![Party::new("p")]),
        ];

        filters.set_search("   ");
        assert_eq!(filters.search(), "   ");
        assert!(!filters.are_filters_active());
        assert_eq!(filters.filter_games(&games, &modes(FilterMode::And)).len(), 2);

        filters.set_search(" hades ");
        assert!(filters.are_filters_active());
        assert_eq!(
            filters.filter_games(&games, &modes(FilterMode::And)),
            vec![GameId::from("Hades")]
        );
    }

    #[test]
    fn test_no_filters_returns_everything_in_order() {
        let filters = FilterStore::new();
        let games = vec![
            game_with("B", vec![Party::new("p")]),
            game_with("A", vec![Party::new("p")]),
        ];
        assert!(!filters.are_filters_active());
        assert_eq!(
            filters.filter_games(&games, &modes(FilterMode::And)),
            vec![GameId::from("B"), GameId::from("A")]
        );
    }

    #[test]
    fn test_forget_tag() {
        let mut filters = FilterStore::new();
        filters.toggle_selection(TagCategory::Friend, &tag("a"));
        filters.toggle_exclusion(TagCategory::Category, &tag("b"));
        let revision = filters.revision();

        assert!(filters.forget_tag(&tag("a")));
        assert!(!filters.forget_tag(&tag("zzz")));
        assert!(filters.selected(TagCategory::Friend).is_empty());
        assert!(filters.revision() > revision);

        filters.clear_all();
        assert!(!filters.are_filters_active());
    }
}
