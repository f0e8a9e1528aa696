//! Data store - the single owner of tags, games, parties and reminders.
//!
//! Every mutation validates its input first and only then touches state, so a failed call
//! leaves the store exactly as it was. Cascades (tag ids pruned from parties, reminders
//! removed with their game or party) run inside the same call as the primary delete.
//!
//! The store keeps a revision counter that is bumped by every successful mutation. Derived
//! views (the filtered game list, sort order) compare revisions to decide whether they are
//! stale. Counter updates deliberately leave the revision alone.

use crate::{
    errors::{Error, Result},
    models::{
        CategoryMap, Game, GameId, NewGame, Party, PartyId, Reminder, ReminderId, Tag,
        TagCategory, TagId, fold_case,
        game::DEFAULT_PARTY_NAME,
        reminder::{parse_reminder_date, validate_reminder_message},
    },
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Outcome of [`DataStore::restore_game`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredGame {
    /// Id of the restored game
    pub id: GameId,
    /// Tag references and duplicate parties that were dropped
    pub dropped_tag_refs: usize,
    /// Saved party id to the id it was stored under, for ids already used elsewhere
    pub remapped_parties: HashMap<PartyId, PartyId>,
}

/// Canonical collections of the board.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    tags: CategoryMap<Vec<Tag>>,
    games: Vec<Game>,
    reminders: Vec<Reminder>,
    revision: u64,
}

impl DataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic counter bumped by every successful mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Tags of one category in their current display order.
    #[must_use]
    pub fn tags(&self, category: TagCategory) -> &[Tag] {
        &self.tags[category]
    }

    pub(crate) fn tags_mut(&mut self, category: TagCategory) -> &mut Vec<Tag> {
        &mut self.tags[category]
    }

    /// Iterates every tag of every category.
    pub fn all_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().flat_map(|(_, tags)| tags.iter())
    }

    /// Looks a tag up by id in any category.
    #[must_use]
    pub fn tag(&self, tag_id: &TagId) -> Option<&Tag> {
        self.all_tags().find(|t| &t.id == tag_id)
    }

    /// Category of the tag with this id, if it exists.
    #[must_use]
    pub fn find_tag_category(&self, tag_id: &TagId) -> Option<TagCategory> {
        self.tag(tag_id).map(|t| t.category)
    }

    /// Finds a tag by name within a category, ignoring case.
    #[must_use]
    pub fn tag_by_name(&self, category: TagCategory, name: &str) -> Option<&Tag> {
        let key = fold_case(name);
        self.tags[category].iter().find(|t| fold_case(&t.name) == key)
    }

    fn tag_name_taken(&self, category: TagCategory, name: &str, except: Option<&TagId>) -> bool {
        let key = fold_case(name);
        self.tags[category]
            .iter()
            .any(|t| Some(&t.id) != except && fold_case(&t.name) == key)
    }

    /// Creates a tag. The name is trimmed and must be unique within the category.
    #[instrument(skip(self))]
    pub fn add_tag(&mut self, category: TagCategory, name: &str) -> Result<TagId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        if self.tag_name_taken(category, name, None) {
            return Err(Error::DuplicateName {
                category,
                name: name.to_string(),
            });
        }

        let id = TagId::generate();
        self.tags[category].push(Tag::new(id.clone(), category, name.to_string()));
        self.touch();
        info!("Added {} tag '{}' ({})", category, name, id);
        Ok(id)
    }

    /// Restores a tag read from a saved board, keeping its id.
    ///
    /// A name that collides with an existing tag gets a ` (n)` suffix instead of failing,
    /// since one bad record must not block the rest of the board.
    pub fn restore_tag(&mut self, id: TagId, category: TagCategory, name: &str) -> Result<TagId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        if id.as_str().is_empty() || self.tag(&id).is_some() {
            return Err(Error::MalformedImport {
                message: format!("duplicate or empty tag id '{id}'"),
            });
        }
        let name = self.disambiguate(name, |store, candidate| {
            store.tag_name_taken(category, candidate, None)
        });
        self.tags[category].push(Tag::new(id.clone(), category, name));
        self.touch();
        Ok(id)
    }

    /// Renames a tag. Collisions are rejected, never auto-suffixed.
    #[instrument(skip(self))]
    pub fn rename_tag(&mut self, tag_id: &TagId, new_name: &str) -> Result<()> {
        let category = self
            .find_tag_category(tag_id)
            .ok_or_else(|| Error::not_found("tag", tag_id))?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::InvalidName);
        }
        if self.tag_name_taken(category, new_name, Some(tag_id)) {
            return Err(Error::DuplicateName {
                category,
                name: new_name.to_string(),
            });
        }

        if let Some(tag) = self.tags[category].iter_mut().find(|t| &t.id == tag_id) {
            debug!("Renaming tag '{}' to '{}'", tag.name, new_name);
            tag.name = new_name.to_string();
        }
        self.touch();
        Ok(())
    }

    /// Deletes a tag and removes its id from every party of every game.
    #[instrument(skip(self))]
    pub fn delete_tag(&mut self, tag_id: &TagId) -> Result<Tag> {
        let category = self
            .find_tag_category(tag_id)
            .ok_or_else(|| Error::not_found("tag", tag_id))?;
        let position = self.tags[category]
            .iter()
            .position(|t| &t.id == tag_id)
            .ok_or_else(|| Error::not_found("tag", tag_id))?;
        let removed = self.tags[category].remove(position);

        let mut pruned = 0usize;
        for party in self.games.iter_mut().flat_map(|g| g.parties.iter_mut()) {
            if party.tag_ids[category].remove(tag_id) {
                pruned += 1;
            }
        }
        self.touch();
        info!(
            "Deleted {} tag '{}', pruned from {} parties",
            category, removed.name, pruned
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    /// Games in their current display order.
    #[must_use]
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub(crate) fn games_mut(&mut self) -> &mut Vec<Game> {
        &mut self.games
    }

    /// Looks a game up by id.
    #[must_use]
    pub fn game(&self, game_id: &GameId) -> Option<&Game> {
        self.games.iter().find(|g| &g.id == game_id)
    }

    fn game_mut(&mut self, game_id: &GameId) -> Result<&mut Game> {
        self.games
            .iter_mut()
            .find(|g| &g.id == game_id)
            .ok_or_else(|| Error::not_found("game", game_id))
    }

    /// Finds a game by title, ignoring case.
    #[must_use]
    pub fn game_by_title(&self, title: &str) -> Option<&Game> {
        let key = fold_case(title);
        self.games.iter().find(|g| fold_case(&g.title) == key)
    }

    fn title_taken(&self, title: &str, except: Option<&GameId>) -> bool {
        let key = fold_case(title);
        self.games
            .iter()
            .any(|g| Some(&g.id) != except && fold_case(&g.title) == key)
    }

    /// Appends ` (2)`, ` (3)`, ... until `taken` no longer matches.
    fn disambiguate(&self, base: &str, taken: impl Fn(&Self, &str) -> bool) -> String {
        if !taken(self, base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} ({n})"))
            .find(|candidate| !taken(self, candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Validates and normalizes game input against the rest of the board.
    fn validate_game(
        &self,
        input: NewGame,
        except: Option<&GameId>,
        disambiguate_title: bool,
    ) -> Result<NewGame> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::MissingTitle);
        }
        let cover_image_url = input.cover_image_url.trim().to_string();
        if cover_image_url.is_empty() {
            return Err(Error::MissingCover);
        }

        let store_id = input
            .store_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if input.store_type.is_external() {
            let Some(id) = store_id.as_deref() else {
                return Err(Error::MissingExternalId {
                    store_type: input.store_type.to_string(),
                });
            };
            let duplicate = self.games.iter().any(|g| {
                Some(&g.id) != except
                    && g.store_type == input.store_type
                    && g.store_id.as_deref() == Some(id)
            });
            if duplicate {
                return Err(Error::DuplicateExternalId {
                    store_type: input.store_type.to_string(),
                    store_id: id.to_string(),
                });
            }
        }

        let title = if self.title_taken(&title, except) {
            if !disambiguate_title {
                return Err(Error::DuplicateTitle { title });
            }
            self.disambiguate(&title, |store, candidate| store.title_taken(candidate, except))
        } else {
            title
        };

        Ok(NewGame {
            title,
            cover_image_url,
            sorting_title: input
                .sorting_title
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            store_type: input.store_type,
            store_id,
            sgdb_id: input.sgdb_id,
        })
    }

    fn push_game(&mut self, input: NewGame, parties: Vec<Party>, id: GameId) -> GameId {
        let parties = if parties.is_empty() {
            vec![Party::new(DEFAULT_PARTY_NAME)]
        } else {
            parties
        };
        info!("Added game '{}' ({})", input.title, id);
        self.games.push(Game {
            id: id.clone(),
            title: input.title,
            sorting_title: input.sorting_title,
            cover_image_url: input.cover_image_url,
            store_type: input.store_type,
            store_id: input.store_id,
            sgdb_id: input.sgdb_id,
            parties,
        });
        self.touch();
        id
    }

    /// Creates a game with one default party. Duplicate titles are rejected.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub fn add_game(&mut self, input: NewGame) -> Result<GameId> {
        let input = self.validate_game(input, None, false)?;
        Ok(self.push_game(input, Vec::new(), GameId::generate()))
    }

    /// Creates a game from an import flow, suffixing the title on collision.
    pub fn import_game(&mut self, input: NewGame) -> Result<GameId> {
        let input = self.validate_game(input, None, true)?;
        Ok(self.push_game(input, Vec::new(), GameId::generate()))
    }

    /// Restores a saved game with its id and parties.
    ///
    /// Party tag references that do not name an existing tag of the right category are
    /// dropped. A party whose id is already used by another game gets a fresh id; the
    /// returned [`RestoredGame`] maps old ids to new ones so party-scoped records follow.
    pub fn restore_game(&mut self, game: Game) -> Result<RestoredGame> {
        if game.id.as_str().is_empty() || self.game(&game.id).is_some() {
            return Err(Error::MalformedImport {
                message: format!("duplicate or empty game id '{}'", game.id),
            });
        }
        let input = self.validate_game(
            NewGame {
                title: game.title,
                cover_image_url: game.cover_image_url,
                sorting_title: game.sorting_title,
                store_type: game.store_type,
                store_id: game.store_id,
                sgdb_id: game.sgdb_id,
            },
            None,
            true,
        )?;

        let taken: HashSet<&PartyId> = self
            .games
            .iter()
            .flat_map(|g| g.parties.iter().map(|p| &p.id))
            .collect();
        let mut dropped_tag_refs = 0usize;
        let mut remapped_parties = HashMap::new();
        let mut seen_parties = HashSet::new();
        let mut parties = Vec::with_capacity(game.parties.len());
        for mut party in game.parties {
            if !seen_parties.insert(party.id.clone()) {
                dropped_tag_refs += 1;
                continue;
            }
            if taken.contains(&party.id) {
                let fresh = PartyId::generate();
                warn!(
                    "Party id {} of game {} is already in use, reassigned to {}",
                    party.id, game.id, fresh
                );
                remapped_parties.insert(std::mem::replace(&mut party.id, fresh.clone()), fresh);
            }
            for category in TagCategory::ALL {
                let before = party.tag_ids[category].len();
                party.tag_ids[category]
                    .retain(|id| self.tags[category].iter().any(|t| &t.id == id));
                dropped_tag_refs += before - party.tag_ids[category].len();
            }
            parties.push(party);
        }
        let id = self.push_game(input, parties, game.id);
        Ok(RestoredGame {
            id,
            dropped_tag_refs,
            remapped_parties,
        })
    }

    /// Edits a game's metadata in place. Parties are untouched.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub fn edit_game(&mut self, game_id: &GameId, input: NewGame) -> Result<()> {
        if self.game(game_id).is_none() {
            return Err(Error::not_found("game", game_id));
        }
        let input = self.validate_game(input, Some(game_id), false)?;
        let game = self.game_mut(game_id)?;
        game.title = input.title;
        game.cover_image_url = input.cover_image_url;
        game.sorting_title = input.sorting_title;
        game.store_type = input.store_type;
        game.store_id = input.store_id;
        game.sgdb_id = input.sgdb_id;
        self.touch();
        Ok(())
    }

    /// Deletes a game together with its parties and reminders.
    #[instrument(skip(self))]
    pub fn delete_game(&mut self, game_id: &GameId) -> Result<Game> {
        let position = self
            .games
            .iter()
            .position(|g| &g.id == game_id)
            .ok_or_else(|| Error::not_found("game", game_id))?;
        let removed = self.games.remove(position);
        let before = self.reminders.len();
        self.reminders.retain(|r| &r.game_id != game_id);
        self.touch();
        info!(
            "Deleted game '{}' and {} reminders",
            removed.title,
            before - self.reminders.len()
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    /// Appends a party to a game. A blank name becomes "Party N".
    pub fn add_party(&mut self, game_id: &GameId, name: Option<&str>) -> Result<PartyId> {
        let game = self.game_mut(game_id)?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("Party {}", game.parties.len() + 1), str::to_string);
        let party = Party::new(name);
        let id = party.id.clone();
        debug!("Adding party '{}' to '{}'", party.name, game.title);
        game.parties.push(party);
        self.touch();
        Ok(id)
    }

    /// Deletes a party and any reminders scoped to it. The last party cannot be removed.
    pub fn delete_party(&mut self, game_id: &GameId, party_id: &PartyId) -> Result<Party> {
        let game = self.game_mut(game_id)?;
        let position = game
            .parties
            .iter()
            .position(|p| &p.id == party_id)
            .ok_or_else(|| Error::not_found("party", party_id))?;
        if game.parties.len() == 1 {
            return Err(Error::LastParty {
                game_id: game_id.to_string(),
            });
        }
        let removed = game.parties.remove(position);
        self.reminders.retain(|r| {
            !(&r.game_id == game_id && r.party_id.as_ref() == Some(party_id))
        });
        self.touch();
        Ok(removed)
    }

    fn party_mut(&mut self, game_id: &GameId, party_id: &PartyId) -> Result<&mut Party> {
        self.game_mut(game_id)?
            .party_mut(party_id)
            .ok_or_else(|| Error::not_found("party", party_id))
    }

    /// Renames a party. Party names carry no uniqueness constraint.
    pub fn rename_party(&mut self, game_id: &GameId, party_id: &PartyId, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        self.party_mut(game_id, party_id)?.name = name.to_string();
        self.touch();
        Ok(())
    }

    /// Replaces a party's note.
    pub fn set_party_note(
        &mut self,
        game_id: &GameId,
        party_id: &PartyId,
        note: &str,
    ) -> Result<()> {
        self.party_mut(game_id, party_id)?.note = note.to_string();
        self.touch();
        Ok(())
    }

    /// Adds a tag to a party. Returns `false` when the party already had it.
    pub fn add_tag_to_party(
        &mut self,
        game_id: &GameId,
        party_id: &PartyId,
        tag_id: &TagId,
    ) -> Result<bool> {
        let category = self
            .find_tag_category(tag_id)
            .ok_or_else(|| Error::not_found("tag", tag_id))?;
        let added = self.party_mut(game_id, party_id)?.tag_ids[category].insert(tag_id.clone());
        if added {
            self.touch();
        }
        Ok(added)
    }

    /// Removes a tag from a party. Returns `false` when the party did not have it.
    pub fn remove_tag_from_party(
        &mut self,
        game_id: &GameId,
        party_id: &PartyId,
        tag_id: &TagId,
    ) -> Result<bool> {
        let category = self
            .find_tag_category(tag_id)
            .ok_or_else(|| Error::not_found("tag", tag_id))?;
        let removed = self.party_mut(game_id, party_id)?.tag_ids[category].remove(tag_id);
        if removed {
            self.touch();
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Reminders
    // ------------------------------------------------------------------

    /// All reminders in insertion order.
    #[must_use]
    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    /// Reminders attached to one game.
    pub fn reminders_for_game<'a>(
        &'a self,
        game_id: &'a GameId,
    ) -> impl Iterator<Item = &'a Reminder> + 'a {
        self.reminders.iter().filter(move |r| &r.game_id == game_id)
    }

    /// Reminders due on or after `today`, soonest first.
    #[must_use]
    pub fn upcoming_reminders(&self, today: NaiveDate) -> Vec<&Reminder> {
        let mut upcoming: Vec<_> = self.reminders.iter().filter(|r| r.date >= today).collect();
        upcoming.sort_by_key(|r| r.date);
        upcoming
    }

    /// Inserts a fully-formed reminder after validating its references.
    pub fn insert_reminder(&mut self, reminder: Reminder) -> Result<()> {
        if self.reminders.iter().any(|r| r.id == reminder.id) {
            return Err(Error::InvalidReminder {
                message: format!("duplicate reminder id '{}'", reminder.id),
            });
        }
        let message = validate_reminder_message(&reminder.message)?;
        let game = self
            .game(&reminder.game_id)
            .ok_or_else(|| Error::not_found("game", &reminder.game_id))?;
        if let Some(party_id) = &reminder.party_id {
            if game.party(party_id).is_none() {
                return Err(Error::not_found("party", party_id));
            }
        }
        self.reminders.push(Reminder { message, ..reminder });
        self.touch();
        Ok(())
    }

    /// Creates a reminder from user input. `date` is `YYYY-MM-DD`.
    pub fn add_reminder(
        &mut self,
        game_id: &GameId,
        party_id: Option<&PartyId>,
        date: &str,
        message: &str,
    ) -> Result<ReminderId> {
        let id = ReminderId::generate();
        self.insert_reminder(Reminder {
            id: id.clone(),
            date: parse_reminder_date(date)?,
            message: message.to_string(),
            game_id: game_id.clone(),
            party_id: party_id.cloned(),
        })?;
        Ok(id)
    }

    /// Changes the date and message of a reminder.
    pub fn edit_reminder(
        &mut self,
        reminder_id: &ReminderId,
        date: &str,
        message: &str,
    ) -> Result<()> {
        let date = parse_reminder_date(date)?;
        let message = validate_reminder_message(message)?;
        let reminder = self
            .reminders
            .iter_mut()
            .find(|r| &r.id == reminder_id)
            .ok_or_else(|| Error::not_found("reminder", reminder_id))?;
        reminder.date = date;
        reminder.message = message;
        self.touch();
        Ok(())
    }

    /// Deletes a reminder.
    pub fn remove_reminder(&mut self, reminder_id: &ReminderId) -> Result<Reminder> {
        let position = self
            .reminders
            .iter()
            .position(|r| &r.id == reminder_id)
            .ok_or_else(|| Error::not_found("reminder", reminder_id))?;
        self.touch();
        Ok(self.reminders.remove(position))
    }

    // ------------------------------------------------------------------
    // Counters
    // ------------------------------------------------------------------

    /// Recomputes both counters of every tag. O(tags x games).
    pub fn update_all_tag_counters(&mut self, filtered: &[GameId]) {
        let filtered: HashSet<&GameId> = filtered.iter().collect();
        let games = &self.games;
        for tags in self.tags.values_mut() {
            for tag in tags.iter_mut() {
                let (total, in_filter) = count_games_with_tag(games, &filtered, &tag.id);
                tag.total_games_count = total;
                tag.filtered_games_count = in_filter;
            }
        }
    }

    /// Recomputes the counters of a single tag. O(games).
    pub fn update_single_tag_counters(&mut self, tag_id: &TagId, filtered: &[GameId]) {
        let Some(category) = self.find_tag_category(tag_id) else {
            return;
        };
        let filtered: HashSet<&GameId> = filtered.iter().collect();
        let (total, in_filter) = count_games_with_tag(&self.games, &filtered, tag_id);
        if let Some(tag) = self.tags[category].iter_mut().find(|t| &t.id == tag_id) {
            tag.total_games_count = total;
            tag.filtered_games_count = in_filter;
        }
    }
}

fn count_games_with_tag(
    games: &[Game],
    filtered: &HashSet<&GameId>,
    tag_id: &TagId,
) -> (usize, usize) {
    games
        .iter()
        .filter(|g| g.has_tag(tag_id))
        .fold((0, 0), |(total, in_filter), g| {
            (total + 1, in_filter + usize::from(filtered.contains(&g.id)))
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::StoreType;

    fn store_with_game(title: &str) -> (DataStore, GameId) {
        let mut store = DataStore::new();
        let id = store.add_game(NewGame::custom(title, "/cover.png")).unwrap();
        (store, id)
    }

    #[test]
    fn test_add_tag_validation() {
        let mut store = DataStore::new();
        assert!(matches!(
            store.add_tag(TagCategory::Friend, "   "),
            Err(Error::InvalidName)
        ));

        let id = store.add_tag(TagCategory::Friend, "  Sam ").unwrap();
        assert_eq!(store.tag(&id).unwrap().name, "Sam");

        let duplicate = store.add_tag(TagCategory::Friend, "sAM");
        assert!(matches!(
            duplicate,
            Err(Error::DuplicateName {
                category: TagCategory::Friend,
                ..
            })
        ));

        // Same name in another category is fine
        assert!(store.add_tag(TagCategory::Status, "Sam").is_ok());

        assert_eq!(store.tag_by_name(TagCategory::Friend, "sam").unwrap().id, id);
        assert!(store.tag_by_name(TagCategory::Category, "Sam").is_none());
    }

    #[test]
    fn test_rename_tag() {
        let mut store = DataStore::new();
        let sam = store.add_tag(TagCategory::Friend, "Sam").unwrap();
        store.add_tag(TagCategory::Friend, "Alex").unwrap();

        assert!(matches!(
            store.rename_tag(&sam, "ALEX"),
            Err(Error::DuplicateName { .. })
        ));
        assert!(matches!(store.rename_tag(&sam, ""), Err(Error::InvalidName)));
        assert!(matches!(
            store.rename_tag(&TagId::from("missing"), "Jo"),
            Err(Error::NotFound { kind: "tag", .. })
        ));

        // Renaming to a case variant of its own name is allowed
        store.rename_tag(&sam, "SAM").unwrap();
        assert_eq!(store.tag(&sam).unwrap().name, "SAM");
    }

    #[test]
    fn test_delete_tag_cascades_to_parties() {
        let (mut store, game) = store_with_game("Hades");
        let party2 = store.add_party(&game, Some("Second run")).unwrap();
        let party1 = store.game(&game).unwrap().parties[0].id.clone();
        let sam = store.add_tag(TagCategory::Friend, "Sam").unwrap();
        store.add_tag_to_party(&game, &party1, &sam).unwrap();
        store.add_tag_to_party(&game, &party2, &sam).unwrap();

        let removed = store.delete_tag(&sam).unwrap();
        assert_eq!(removed.name, "Sam");
        assert!(store.tag(&sam).is_none());
        assert!(!store.game(&game).unwrap().has_tag(&sam));
        assert!(matches!(
            store.delete_tag(&sam),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_add_game_validation() {
        let mut store = DataStore::new();
        assert!(matches!(
            store.add_game(NewGame::custom(" ", "/c.png")),
            Err(Error::MissingTitle)
        ));
        assert!(matches!(
            store.add_game(NewGame::custom("Hades", "")),
            Err(Error::MissingCover)
        ));
        let mut steam = NewGame::custom("Celeste", "/c.png");
        steam.store_type = StoreType::Steam;
        assert!(matches!(
            store.add_game(steam),
            Err(Error::MissingExternalId { .. })
        ));

        let id = store.add_game(NewGame::custom("Hades", "/c.png")).unwrap();
        let game = store.game(&id).unwrap();
        assert_eq!(game.parties.len(), 1);
        assert_eq!(game.parties[0].name, DEFAULT_PARTY_NAME);

        assert!(matches!(
            store.add_game(NewGame::custom("HADES", "/c.png")),
            Err(Error::DuplicateTitle { .. })
        ));
    }

    #[test]
    fn test_duplicate_external_id() {
        let mut store = DataStore::new();
        store
            .add_game(NewGame::from_store("Celeste", "/c.png", StoreType::Steam, "504230"))
            .unwrap();
        let again = store.add_game(NewGame::from_store(
            "Celeste Deluxe",
            "/c.png",
            StoreType::Steam,
            "504230",
        ));
        assert!(matches!(again, Err(Error::DuplicateExternalId { .. })));

        // Custom games never collide on store id
        let mut custom = NewGame::custom("Celeste (itch)", "/c.png");
        custom.store_id = Some("504230".to_string());
        assert!(store.add_game(custom).is_ok());
    }

    #[test]
    fn test_edit_game_keeps_own_store_id() {
        let mut store = DataStore::new();
        let celeste = store
            .add_game(NewGame::from_store("Celeste", "/c.png", StoreType::Steam, "504230"))
            .unwrap();
        store
            .add_game(NewGame::from_store("Hades", "/h.png", StoreType::Steam, "1145360"))
            .unwrap();

        let retitled =
            NewGame::from_store("Celeste Deluxe", "/c2.png", StoreType::Steam, "504230");
        store.edit_game(&celeste, retitled).unwrap();
        let game = store.game(&celeste).unwrap();
        assert_eq!(game.title, "Celeste Deluxe");
        assert_eq!(game.store_id.as_deref(), Some("504230"));

        let stolen =
            NewGame::from_store("Celeste Deluxe", "/c2.png", StoreType::Steam, "1145360");
        assert!(matches!(
            store.edit_game(&celeste, stolen),
            Err(Error::DuplicateExternalId { .. })
        ));
        assert_eq!(
            store.game(&celeste).unwrap().store_id.as_deref(),
            Some("504230")
        );
    }

    #[test]
    fn test_import_game_disambiguates_title() {
        let (mut store, _) = store_with_game("Hades");
        let second = store.import_game(NewGame::custom("hades", "/c.png")).unwrap();
        let third = store.import_game(NewGame::custom("Hades", "/c.png")).unwrap();
        assert_eq!(store.game(&second).unwrap().title, "hades (2)");
        assert_eq!(store.game(&third).unwrap().title, "Hades (3)");
    }

    #[test]
    fn test_edit_game_excludes_itself_from_duplicate_check() {
        let (mut store, hades) = store_with_game("Hades");
        store.add_game(NewGame::custom("Celeste", "/c.png")).unwrap();

        let mut edit = NewGame::custom("HADES", "/new.png");
        edit.sorting_title = Some("  ".to_string());
        store.edit_game(&hades, edit).unwrap();
        let game = store.game(&hades).unwrap();
        assert_eq!(game.title, "HADES");
        assert_eq!(game.cover_image_url, "/new.png");
        assert_eq!(game.sorting_title, None);

        assert!(matches!(
            store.edit_game(&hades, NewGame::custom("celeste", "/c.png")),
            Err(Error::DuplicateTitle { .. })
        ));
        // Failed edit left the game alone
        assert_eq!(store.game(&hades).unwrap().title, "HADES");
    }

    #[test]
    fn test_delete_game_cascades_reminders() {
        let (mut store, hades) = store_with_game("Hades");
        store.add_game(NewGame::custom("Celeste", "/c.png")).unwrap();
        let celeste = store.game_by_title("celeste").unwrap().id.clone();
        store
            .add_reminder(&hades, None, "2026-01-01", "Try heat 8")
            .unwrap();
        store
            .add_reminder(&celeste, None, "2026-01-02", "B-sides")
            .unwrap();

        assert_eq!(store.reminders_for_game(&hades).count(), 1);

        store.delete_game(&hades).unwrap();
        assert_eq!(store.reminders().len(), 1);
        assert_eq!(store.reminders()[0].game_id, celeste);
        assert_eq!(store.reminders_for_game(&hades).count(), 0);
        assert!(matches!(
            store.delete_game(&hades),
            Err(Error::NotFound { kind: "game", .. })
        ));
    }

    #[test]
    fn test_delete_party() {
        let (mut store, game) = store_with_game("Hades");
        let first = store.game(&game).unwrap().parties[0].id.clone();
        assert!(matches!(
            store.delete_party(&game, &first),
            Err(Error::LastParty { .. })
        ));

        let second = store.add_party(&game, None).unwrap();
        assert_eq!(store.game(&game).unwrap().party(&second).unwrap().name, "Party 2");
        store
            .add_reminder(&game, Some(&second), "2026-03-01", "Party night")
            .unwrap();
        store
            .add_reminder(&game, None, "2026-03-02", "Whole game")
            .unwrap();

        store.delete_party(&game, &second).unwrap();
        assert_eq!(store.game(&game).unwrap().parties.len(), 1);
        assert_eq!(store.reminders().len(), 1);
        assert!(matches!(
            store.delete_party(&game, &second),
            Err(Error::NotFound { kind: "party", .. })
        ));
    }

    #[test]
    fn test_restore_reassigns_party_id_used_by_another_game() {
        let (mut store, hades) = store_with_game("Hades");
        let shared = store.game(&hades).unwrap().parties[0].id.clone();
        store.add_party(&hades, None).unwrap();

        let celeste = Game {
            id: GameId::from("celeste"),
            title: "Celeste".to_string(),
            sorting_title: None,
            cover_image_url: "/c.png".to_string(),
            store_type: StoreType::Custom,
            store_id: None,
            sgdb_id: None,
            parties: vec![Party {
                id: shared.clone(),
                ..Party::new(DEFAULT_PARTY_NAME)
            }],
        };
        let restored = store.restore_game(celeste).unwrap();
        let fresh = restored.remapped_parties[&shared].clone();
        assert_ne!(fresh, shared);
        assert_eq!(store.game(&restored.id).unwrap().parties[0].id, fresh);

        store
            .add_reminder(&hades, Some(&shared), "2026-03-01", "Hades night")
            .unwrap();
        store
            .add_reminder(&restored.id, Some(&fresh), "2026-03-02", "Celeste night")
            .unwrap();
        store.delete_party(&hades, &shared).unwrap();
        let left: Vec<_> = store.reminders().iter().map(|r| r.message.as_str()).collect();
        assert_eq!(left, vec!["Celeste night"]);
    }

    #[test]
    fn test_reminder_validation() {
        let (mut store, game) = store_with_game("Hades");
        assert!(matches!(
            store.add_reminder(&game, None, "2026-13-01", "msg"),
            Err(Error::InvalidReminder { .. })
        ));
        assert!(matches!(
            store.add_reminder(&game, None, "2026-01-01", "  "),
            Err(Error::InvalidReminder { .. })
        ));
        assert!(matches!(
            store.add_reminder(&GameId::from("nope"), None, "2026-01-01", "msg"),
            Err(Error::NotFound { kind: "game", .. })
        ));

        let id = store.add_reminder(&game, None, "2026-01-01", "msg").unwrap();
        let duplicate = Reminder {
            id: id.clone(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            message: "again".to_string(),
            game_id: game.clone(),
            party_id: None,
        };
        assert!(matches!(
            store.insert_reminder(duplicate),
            Err(Error::InvalidReminder { .. })
        ));

        store.edit_reminder(&id, "2026-02-01", "later").unwrap();
        assert_eq!(store.reminders()[0].message, "later");
        store.remove_reminder(&id).unwrap();
        assert!(store.reminders().is_empty());
    }

    #[test]
    fn test_upcoming_reminders_sorted() {
        let (mut store, game) = store_with_game("Hades");
        store.add_reminder(&game, None, "2026-05-01", "late").unwrap();
        store.add_reminder(&game, None, "2026-01-01", "past").unwrap();
        store.add_reminder(&game, None, "2026-03-01", "soon").unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let upcoming: Vec<_> = store
            .upcoming_reminders(today)
            .into_iter()
            .map(|r| r.message.as_str())
            .collect();
        assert_eq!(upcoming, vec!["soon", "late"]);
    }

    #[test]
    fn test_counters() {
        let (mut store, hades) = store_with_game("Hades");
        let celeste = store.add_game(NewGame::custom("Celeste", "/c.png")).unwrap();
        let sam = store.add_tag(TagCategory::Friend, "Sam").unwrap();
        let coop = store.add_tag(TagCategory::Category, "Co-op").unwrap();
        for game in [&hades, &celeste] {
            let party = store.game(game).unwrap().parties[0].id.clone();
            store.add_tag_to_party(game, &party, &sam).unwrap();
        }
        let extra = store.add_party(&hades, None).unwrap();
        store.add_tag_to_party(&hades, &extra, &coop).unwrap();
        // A second party with the same tag still counts the game once
        store.add_tag_to_party(&hades, &extra, &sam).unwrap();

        store.update_all_tag_counters(std::slice::from_ref(&hades));
        let first: Vec<_> = store
            .all_tags()
            .map(|t| (t.total_games_count, t.filtered_games_count))
            .collect();
        assert_eq!(store.tag(&sam).unwrap().total_games_count, 2);
        assert_eq!(store.tag(&sam).unwrap().filtered_games_count, 1);
        assert_eq!(store.tag(&coop).unwrap().total_games_count, 1);

        let revision = store.revision();
        store.update_all_tag_counters(std::slice::from_ref(&hades));
        let second: Vec<_> = store
            .all_tags()
            .map(|t| (t.total_games_count, t.filtered_games_count))
            .collect();
        assert_eq!(first, second);
        assert_eq!(store.revision(), revision);

        let party = store.game(&celeste).unwrap().parties[0].id.clone();
        store.add_tag_to_party(&celeste, &party, &coop).unwrap();
        store.update_single_tag_counters(&coop, &[hades, celeste]);
        assert_eq!(store.tag(&coop).unwrap().total_games_count, 2);
        assert_eq!(store.tag(&coop).unwrap().filtered_games_count, 2);
    }

    #[test]
    fn test_restore_tag_suffixes_duplicate_names() {
        let mut store = DataStore::new();
        store.add_tag(TagCategory::Status, "Playing").unwrap();
        let id = store
            .restore_tag(TagId::from("t-2"), TagCategory::Status, "playing")
            .unwrap();
        assert_eq!(store.tag(&id).unwrap().name, "playing (2)");
        assert!(matches!(
            store.restore_tag(TagId::from("t-2"), TagCategory::Status, "Done"),
            Err(Error::MalformedImport { .. })
        ));
    }
}
