//! Library - the top-level service object wiring the stores together.
//!
//! The library owns one [`DataStore`], [`FilterStore`] and [`SettingsStore`] and runs the
//! reactive turn after every mutation:
//!
//! 1. rebind sorting reactions whose sort preferences changed,
//! 2. recompute the filtered game list if any input revision moved,
//! 3. push counters into the tags (never bumping a revision, so no feedback loop),
//! 4. let the sorting reactions re-sort what their watched values say is stale.
//!
//! Readers therefore always observe post-mutation state without recomputing anything.

use crate::{
    core::{
        data_store::DataStore,
        filter_store::FilterStore,
        settings_store::{
            FilterMode, GameSortMethod, Settings, SettingsStore, SortDirection, TagSort,
            TagSortMethod,
        },
        sorting::{GameSortReaction, TagSortReaction, game_sort_reaction, tag_sort_reaction},
    },
    errors::{Error, Result},
    models::{
        CategoryMap, Game, GameId, NewGame, Party, PartyId, Reminder, ReminderId, Tag,
        TagCategory, TagId,
    },
};
use tracing::{debug, info};

type RevisionKey = (u64, u64, u64);

/// Tags, games, filters and settings of one board, kept mutually consistent.
pub struct Library {
    data: DataStore,
    filters: FilterStore,
    settings: SettingsStore,
    filtered: Vec<GameId>,
    filtered_key: Option<RevisionKey>,
    tag_sorting: CategoryMap<TagSortReaction>,
    bound_tag_sort: CategoryMap<Option<(TagSort, Vec<TagId>)>>,
    game_sorting: GameSortReaction,
    bound_game_sort: Option<(GameSortMethod, SortDirection)>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// Creates an empty library with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(DataStore::new(), SettingsStore::new())
    }

    /// Wraps already-populated stores and brings every derived value up to date.
    #[must_use]
    pub fn from_parts(data: DataStore, settings: SettingsStore) -> Self {
        let mut library = Self {
            data,
            filters: FilterStore::new(),
            settings,
            filtered: Vec::new(),
            filtered_key: None,
            tag_sorting: CategoryMap::from_fn(|c| {
                tag_sort_reaction(c, TagSort::default(), Vec::new())
            }),
            bound_tag_sort: CategoryMap::default(),
            game_sorting: game_sort_reaction(GameSortMethod::Title, SortDirection::Asc),
            bound_game_sort: None,
        };
        library.refresh(None);
        library
    }

    /// Read access to tags, games and reminders.
    #[must_use]
    pub const fn data(&self) -> &DataStore {
        &self.data
    }

    /// Read access to the filter state.
    #[must_use]
    pub const fn filters(&self) -> &FilterStore {
        &self.filters
    }

    /// Read access to settings and custom orders.
    #[must_use]
    pub const fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Ids of the games passing the current filters, in display order.
    #[must_use]
    pub fn filtered_game_ids(&self) -> &[GameId] {
        &self.filtered
    }

    /// Games passing the current filters, in display order.
    #[must_use]
    pub fn filtered_games(&self) -> Vec<&Game> {
        self.filtered
            .iter()
            .filter_map(|id| self.data.game(id))
            .collect()
    }

    /// Whether any filter would hide a game.
    #[must_use]
    pub fn are_filters_active(&self) -> bool {
        self.filters.are_filters_active()
    }

    // ------------------------------------------------------------------
    // Reactive turn
    // ------------------------------------------------------------------

    fn revision_key(&self) -> RevisionKey {
        (
            self.data.revision(),
            self.filters.revision(),
            self.settings.revision(),
        )
    }

    fn rebind_sorting(&mut self) {
        for category in TagCategory::ALL {
            let wanted = (
                self.settings.tag_sort(category),
                self.settings.custom_order(category).to_vec(),
            );
            if self.bound_tag_sort[category].as_ref() != Some(&wanted) {
                debug!("Rebinding {} tag sorting to {:?}", category, wanted.0);
                self.tag_sorting[category].disable();
                self.tag_sorting[category] =
                    tag_sort_reaction(category, wanted.0, wanted.1.clone());
                self.bound_tag_sort[category] = Some(wanted);
            }
        }

        let game_sort = (
            self.settings.settings().game_sort_method,
            self.settings.settings().game_sort_direction,
        );
        if self.bound_game_sort != Some(game_sort) {
            self.game_sorting.disable();
            self.game_sorting = game_sort_reaction(game_sort.0, game_sort.1);
            self.bound_game_sort = Some(game_sort);
        }
    }

    /// Runs the reactive turn. `touched_tag` names the single tag whose party membership
    /// changed, allowing an O(games) counter update when the filtered set is unchanged.
    fn refresh(&mut self, touched_tag: Option<&TagId>) {
        self.rebind_sorting();

        let key = self.revision_key();
        if self.filtered_key != Some(key) {
            let filtered = self
                .filters
                .filter_games(self.data.games(), self.settings.filter_modes());
            match touched_tag {
                Some(tag_id) if filtered == self.filtered => {
                    self.data.update_single_tag_counters(tag_id, &filtered);
                }
                _ => self.data.update_all_tag_counters(&filtered),
            }
            self.filtered = filtered;
            self.filtered_key = Some(key);
        }

        for reaction in self.tag_sorting.values_mut() {
            if reaction.is_enabled() {
                reaction.run(&mut self.data);
            } else {
                reaction.enable(&mut self.data);
            }
        }
        let games_sorted = if self.game_sorting.is_enabled() {
            self.game_sorting.run(&mut self.data)
        } else {
            self.game_sorting.enable(&mut self.data);
            true
        };
        if games_sorted {
            // Same set, new display order
            self.filtered = self
                .filters
                .filter_games(self.data.games(), self.settings.filter_modes());
        }
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Creates a tag.
    pub fn add_tag(&mut self, category: TagCategory, name: &str) -> Result<TagId> {
        let id = self.data.add_tag(category, name)?;
        self.settings.append_to_custom_order(category, &id);
        self.refresh(None);
        Ok(id)
    }

    /// Renames a tag.
    pub fn rename_tag(&mut self, tag_id: &TagId, new_name: &str) -> Result<()> {
        self.data.rename_tag(tag_id, new_name)?;
        self.refresh(None);
        Ok(())
    }

    /// Deletes a tag everywhere: parties, filters and custom orders.
    pub fn delete_tag(&mut self, tag_id: &TagId) -> Result<Tag> {
        let removed = self.data.delete_tag(tag_id)?;
        self.filters.forget_tag(tag_id);
        self.settings.remove_from_custom_order(tag_id);
        self.refresh(None);
        Ok(removed)
    }

    /// Looks up a tag and checks it belongs to `category`.
    fn checked_tag(&self, category: TagCategory, tag_id: &TagId) -> Result<()> {
        match self.data.find_tag_category(tag_id) {
            None => Err(Error::not_found("tag", tag_id)),
            Some(actual) if actual != category => Err(Error::InvalidTagState {
                message: format!("tag {tag_id} is a {actual} tag, not a {category} tag"),
            }),
            Some(_) => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Games and parties
    // ------------------------------------------------------------------

    /// Creates a game with one default party.
    pub fn add_game(&mut self, input: NewGame) -> Result<GameId> {
        let id = self.data.add_game(input)?;
        self.refresh(None);
        Ok(id)
    }

    /// Creates a game, suffixing a colliding title instead of failing.
    pub fn import_game(&mut self, input: NewGame) -> Result<GameId> {
        let id = self.data.import_game(input)?;
        self.refresh(None);
        Ok(id)
    }

    /// Edits a game's metadata.
    pub fn edit_game(&mut self, game_id: &GameId, input: NewGame) -> Result<()> {
        self.data.edit_game(game_id, input)?;
        self.refresh(None);
        Ok(())
    }

    /// Deletes a game and its reminders.
    pub fn delete_game(&mut self, game_id: &GameId) -> Result<Game> {
        let removed = self.data.delete_game(game_id)?;
        self.refresh(None);
        Ok(removed)
    }

    /// Adds a party to a game.
    pub fn add_party(&mut self, game_id: &GameId, name: Option<&str>) -> Result<PartyId> {
        let id = self.data.add_party(game_id, name)?;
        self.refresh(None);
        Ok(id)
    }

    /// Deletes a party and its reminders.
    pub fn delete_party(&mut self, game_id: &GameId, party_id: &PartyId) -> Result<Party> {
        let removed = self.data.delete_party(game_id, party_id)?;
        self.refresh(None);
        Ok(removed)
    }

    /// Renames a party.
    pub fn rename_party(&mut self, game_id: &GameId, party_id: &PartyId, name: &str) -> Result<()> {
        self.data.rename_party(game_id, party_id, name)?;
        self.refresh(None);
        Ok(())
    }

    /// Replaces a party note.
    pub fn set_party_note(
        &mut self,
        game_id: &GameId,
        party_id: &PartyId,
        note: &str,
    ) -> Result<()> {
        self.data.set_party_note(game_id, party_id, note)?;
        self.refresh(None);
        Ok(())
    }

    /// Tags a party.
    pub fn add_tag_to_party(
        &mut self,
        game_id: &GameId,
        party_id: &PartyId,
        tag_id: &TagId,
    ) -> Result<bool> {
        let added = self.data.add_tag_to_party(game_id, party_id, tag_id)?;
        self.refresh(Some(tag_id));
        Ok(added)
    }

    /// Untags a party.
    pub fn remove_tag_from_party(
        &mut self,
        game_id: &GameId,
        party_id: &PartyId,
        tag_id: &TagId,
    ) -> Result<bool> {
        let removed = self.data.remove_tag_from_party(game_id, party_id, tag_id)?;
        self.refresh(Some(tag_id));
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Reminders
    // ------------------------------------------------------------------

    /// Creates a reminder.
    pub fn add_reminder(
        &mut self,
        game_id: &GameId,
        party_id: Option<&PartyId>,
        date: &str,
        message: &str,
    ) -> Result<ReminderId> {
        let id = self.data.add_reminder(game_id, party_id, date, message)?;
        self.refresh(None);
        Ok(id)
    }

    /// Edits a reminder.
    pub fn edit_reminder(
        &mut self,
        reminder_id: &ReminderId,
        date: &str,
        message: &str,
    ) -> Result<()> {
        self.data.edit_reminder(reminder_id, date, message)?;
        self.refresh(None);
        Ok(())
    }

    /// Deletes a reminder.
    pub fn remove_reminder(&mut self, reminder_id: &ReminderId) -> Result<Reminder> {
        let removed = self.data.remove_reminder(reminder_id)?;
        self.refresh(None);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Replaces the search text.
    pub fn set_search(&mut self, search: &str) {
        self.filters.set_search(search);
        self.refresh(None);
    }

    /// Flips selection of an existing tag of `category`.
    pub fn toggle_selection(&mut self, category: TagCategory, tag_id: &TagId) -> Result<bool> {
        self.checked_tag(category, tag_id)?;
        let selected = self.filters.toggle_selection(category, tag_id);
        self.refresh(None);
        Ok(selected)
    }

    /// Flips exclusion of an existing tag of `category`.
    pub fn toggle_exclusion(&mut self, category: TagCategory, tag_id: &TagId) -> Result<bool> {
        self.checked_tag(category, tag_id)?;
        let excluded = self.filters.toggle_exclusion(category, tag_id);
        self.refresh(None);
        Ok(excluded)
    }

    /// Clears selections and exclusions of one category.
    pub fn clear_filter_category(&mut self, category: TagCategory) {
        self.filters.clear_category(category);
        self.refresh(None);
    }

    /// Clears every filter.
    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
        self.refresh(None);
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Sets AND/OR for a category.
    pub fn set_filter_mode(&mut self, category: TagCategory, mode: FilterMode) {
        self.settings.set_filter_mode(category, mode);
        self.refresh(None);
    }

    /// Sets how a tag category is ordered.
    ///
    /// Switching to custom order with an empty list seeds it from the current order.
    pub fn set_tag_sort(
        &mut self,
        category: TagCategory,
        method: TagSortMethod,
        direction: SortDirection,
    ) {
        if method == TagSortMethod::Custom && self.settings.custom_order(category).is_empty() {
            let seed = self.data.tags(category).iter().map(|t| t.id.clone()).collect();
            self.settings.set_custom_order(category, seed);
        }
        self.settings.set_tag_sort_method(category, method);
        self.settings.set_tag_sort_direction(category, direction);
        self.refresh(None);
    }

    /// Replaces the custom order of a category. Every id must be a tag of that category.
    pub fn set_custom_order(&mut self, category: TagCategory, order: Vec<TagId>) -> Result<()> {
        for tag_id in &order {
            self.checked_tag(category, tag_id)?;
        }
        self.settings.set_custom_order(category, order);
        self.refresh(None);
        Ok(())
    }

    /// Sets how games are ordered.
    pub fn set_game_sort(&mut self, method: GameSortMethod, direction: SortDirection) {
        self.settings.set_game_sort(method, direction);
        self.refresh(None);
    }

    /// Applies a textual setting from the UI. See [`SettingsStore::apply_option`].
    pub fn apply_setting(
        &mut self,
        field: &str,
        category: Option<TagCategory>,
        value: &str,
    ) -> Result<()> {
        if let (Some(c), "tagSortMethod", "custom") = (category, field, value) {
            let direction = self.settings.tag_sort(c).direction;
            self.set_tag_sort(c, TagSortMethod::Custom, direction);
            return Ok(());
        }
        self.settings.apply_option(field, category, value)?;
        self.refresh(None);
        Ok(())
    }

    /// Replaces the whole board, resetting filters.
    pub fn replace(
        &mut self,
        data: DataStore,
        settings: Settings,
        custom_order: CategoryMap<Vec<TagId>>,
    ) {
        info!(
            "Loading board with {} games and {} tags",
            data.games().len(),
            data.all_tags().count()
        );
        *self = Self::from_parts(data, SettingsStore::with_settings(settings, custom_order));
    }
}
