//! Sorting reactions and the comparators they apply.
//!
//! A [`SortingReaction`] pairs a watch function with a sort action. Running it after a
//! mutation re-sorts only when the watched value differs from the value seen after the
//! previous sort, so collections are ordered once per relevant change instead of per read.

use crate::{
    core::{
        data_store::DataStore,
        settings_store::{GameSortMethod, SortDirection, TagSort, TagSortMethod},
    },
    models::{Game, GameId, Tag, TagCategory, TagId, fold_case},
};
use std::cmp::Ordering;
use tracing::trace;

type WatchFn<C, W> = Box<dyn Fn(&C) -> W>;
type SortFn<C> = Box<dyn Fn(&mut C)>;

/// Re-runs a sort action whenever a watched value changes.
pub struct SortingReaction<C, W> {
    watch: WatchFn<C, W>,
    sort: SortFn<C>,
    last: Option<W>,
    enabled: bool,
}

impl<C, W: PartialEq> SortingReaction<C, W> {
    /// Creates a disabled reaction.
    pub fn new(watch: impl Fn(&C) -> W + 'static, sort: impl Fn(&mut C) + 'static) -> Self {
        Self {
            watch: Box::new(watch),
            sort: Box::new(sort),
            last: None,
            enabled: false,
        }
    }

    /// Binds the reaction and sorts immediately.
    pub fn enable(&mut self, ctx: &mut C) {
        self.enabled = true;
        self.last = None;
        self.run(ctx);
    }

    /// Unbinds the reaction and forgets the last watched value.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.last = None;
    }

    /// Whether the reaction currently reacts to changes.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sorts if enabled and the watched value changed. Returns whether it sorted.
    pub fn run(&mut self, ctx: &mut C) -> bool {
        if !self.enabled {
            return false;
        }
        let current = (self.watch)(ctx);
        if self.last.as_ref() == Some(&current) {
            return false;
        }
        (self.sort)(ctx);
        self.last = Some((self.watch)(ctx));
        true
    }
}

/// Watched value for tag sorting: `(id, folded name, relevant count)` ordered by id.
pub type TagSortWatch = Vec<(TagId, String, usize)>;
/// Watched value for game sorting: `(id, sort key)` ordered by id.
pub type GameSortWatch = Vec<(GameId, String)>;

/// Reaction keeping one tag category ordered.
pub type TagSortReaction = SortingReaction<DataStore, TagSortWatch>;
/// Reaction keeping the game list ordered.
pub type GameSortReaction = SortingReaction<DataStore, GameSortWatch>;

const fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Case-insensitive name order.
#[must_use]
pub fn compare_tags_by_name(a: &Tag, b: &Tag) -> Ordering {
    fold_case(&a.name)
        .cmp(&fold_case(&b.name))
        .then_with(|| a.name.cmp(&b.name))
}

fn relevant_count(tag: &Tag, method: TagSortMethod) -> usize {
    match method {
        TagSortMethod::CountFiltered => tag.filtered_games_count,
        TagSortMethod::CountTotal => tag.total_games_count,
        TagSortMethod::Name | TagSortMethod::Custom => 0,
    }
}

/// Orders tags in place according to `sort`.
///
/// Count methods put the tag with the most games first under [`SortDirection::Asc`]; ties
/// fall back to the name. Custom order lists ids by position, unlisted tags follow by name.
pub fn sort_tags(tags: &mut [Tag], sort: TagSort, custom_order: &[TagId]) {
    let position = |tag: &Tag| custom_order.iter().position(|id| id == &tag.id);
    tags.sort_by(|a, b| {
        let ordering = match sort.method {
            TagSortMethod::Name => compare_tags_by_name(a, b),
            TagSortMethod::CountFiltered | TagSortMethod::CountTotal => {
                relevant_count(b, sort.method)
                    .cmp(&relevant_count(a, sort.method))
                    .then_with(|| compare_tags_by_name(a, b))
            }
            TagSortMethod::Custom => match (position(a), position(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => compare_tags_by_name(a, b),
            },
        };
        apply_direction(ordering, sort.direction)
    });
}

/// Orders games in place by sorting title (or title), case-insensitive.
pub fn sort_games(games: &mut [Game], method: GameSortMethod, direction: SortDirection) {
    match method {
        GameSortMethod::Title => games.sort_by(|a, b| {
            let ordering = a
                .sort_key()
                .cmp(&b.sort_key())
                .then_with(|| a.title.cmp(&b.title));
            apply_direction(ordering, direction)
        }),
    }
}

/// Builds the reaction for one tag category under the given preferences.
#[must_use]
pub fn tag_sort_reaction(
    category: TagCategory,
    sort: TagSort,
    custom_order: Vec<TagId>,
) -> TagSortReaction {
    SortingReaction::new(
        move |data: &DataStore| {
            let mut watched: TagSortWatch = data
                .tags(category)
                .iter()
                .map(|t| (t.id.clone(), fold_case(&t.name), relevant_count(t, sort.method)))
                .collect();
            watched.sort_by(|a, b| a.0.cmp(&b.0));
            watched
        },
        move |data: &mut DataStore| {
            trace!("Sorting {} tags by {:?}", category, sort);
            sort_tags(data.tags_mut(category), sort, &custom_order);
        },
    )
}

/// Builds the reaction for the game list.
#[must_use]
pub fn game_sort_reaction(method: GameSortMethod, direction: SortDirection) -> GameSortReaction {
    SortingReaction::new(
        |data: &DataStore| {
            let mut watched: GameSortWatch = data
                .games()
                .iter()
                .map(|g| (g.id.clone(), g.sort_key()))
                .collect();
            watched.sort_by(|a, b| a.0.cmp(&b.0));
            watched
        },
        move |data: &mut DataStore| {
            trace!("Sorting games by {:?} {:?}", method, direction);
            sort_games(data.games_mut(), method, direction);
        },
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::NewGame;
    use std::{cell::Cell, rc::Rc};

    fn tag(name: &str, filtered: usize, total: usize) -> Tag {
        let mut tag = Tag::new(TagId::from(name), TagCategory::Friend, name.to_string());
        tag.filtered_games_count = filtered;
        tag.total_games_count = total;
        tag
    }

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_reaction_only_sorts_on_change() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut reaction = SortingReaction::new(
            |v: &Vec<i32>| v.len(),
            move |v: &mut Vec<i32>| {
                counter.set(counter.get() + 1);
                v.sort_unstable();
            },
        );
        let mut values = vec![3, 1, 2];

        assert!(!reaction.run(&mut values));
        reaction.enable(&mut values);
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(calls.get(), 1);

        assert!(!reaction.run(&mut values));
        values.push(0);
        assert!(reaction.run(&mut values));
        assert_eq!(values, vec![0, 1, 2, 3]);

        reaction.disable();
        values.push(-1);
        assert!(!reaction.run(&mut values));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_sort_tags_by_name_ignores_case() {
        let mut tags = vec![tag("bob", 0, 0), tag("Alice", 0, 0), tag("carl", 0, 0)];
        sort_tags(&mut tags, TagSort::default(), &[]);
        assert_eq!(names(&tags), vec!["Alice", "bob", "carl"]);

        let desc = TagSort {
            method: TagSortMethod::Name,
            direction: SortDirection::Desc,
        };
        sort_tags(&mut tags, desc, &[]);
        assert_eq!(names(&tags), vec!["carl", "bob", "Alice"]);
    }

    #[test]
    fn test_sort_tags_by_count_most_first() {
        let mut tags = vec![tag("a", 1, 5), tag("b", 3, 1), tag("c", 3, 2)];
        let filtered = TagSort {
            method: TagSortMethod::CountFiltered,
            direction: SortDirection::Asc,
        };
        sort_tags(&mut tags, filtered, &[]);
        assert_eq!(names(&tags), vec!["b", "c", "a"]);

        let total_desc = TagSort {
            method: TagSortMethod::CountTotal,
            direction: SortDirection::Desc,
        };
        sort_tags(&mut tags, total_desc, &[]);
        assert_eq!(names(&tags), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_tags_custom_order() {
        let mut tags = vec![tag("a", 0, 0), tag("z", 0, 0), tag("m", 0, 0), tag("b", 0, 0)];
        let custom = TagSort {
            method: TagSortMethod::Custom,
            direction: SortDirection::Asc,
        };
        sort_tags(&mut tags, custom, &[TagId::from("m"), TagId::from("a")]);
        assert_eq!(names(&tags), vec!["m", "a", "b", "z"]);
    }

    #[test]
    fn test_game_reaction_sorts_by_sorting_title() {
        let mut data = DataStore::new();
        data.add_game(NewGame::custom("The Witcher 3", "/w.png")).unwrap();
        data.add_game(NewGame::custom("celeste", "/c.png")).unwrap();
        let mut hades = NewGame::custom("Hades", "/h.png");
        hades.sorting_title = Some("Zz".to_string());
        data.add_game(hades).unwrap();

        let mut reaction = game_sort_reaction(GameSortMethod::Title, SortDirection::Asc);
        reaction.enable(&mut data);
        let titles: Vec<_> = data.games().iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["celeste", "The Witcher 3", "Hades"]);

        // Nothing changed, nothing to do
        assert!(!reaction.run(&mut data));
        data.add_game(NewGame::custom("Bastion", "/b.png")).unwrap();
        assert!(reaction.run(&mut data));
        assert_eq!(data.games()[0].title, "Bastion");
    }
}
