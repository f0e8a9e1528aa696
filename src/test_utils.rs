//! Shared test utilities for `GameBoard`.
//!
//! This module provides a populated sample library, a database setup helper and a
//! tracing hook so individual tests stay short.

use crate::{
    core::library::Library,
    errors::Result,
    models::{GameId, NewGame, PartyId, TagCategory, TagId},
};
use sea_orm::DatabaseConnection;

/// Ids of the records created by [`sample_library`].
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Friend tag on both games
    pub sam: TagId,
    /// Friend tag on the Hades solo party
    pub alex: TagId,
    /// Category tag on the Hades default party
    pub coop: TagId,
    /// Category tag on the Hades solo party
    pub roguelike: TagId,
    /// Status tag on the Hades default party
    pub playing: TagId,
    /// Status tag on Celeste
    pub finished: TagId,
    /// Game with two parties and a reminder
    pub hades: GameId,
    /// Game with one party
    pub celeste: GameId,
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// First party of a game.
///
/// # Panics
/// Panics if the game does not exist.
#[allow(clippy::expect_used)]
#[must_use]
pub fn default_party(library: &Library, game_id: &GameId) -> PartyId {
    library
        .data()
        .game(game_id)
        .expect("game exists")
        .parties[0]
        .id
        .clone()
}

/// Builds a small board:
///
/// * Hades, default party: Sam, Co-op, Playing
/// * Hades, party "Solo": Alex, Roguelike
/// * Celeste, default party: Sam, Finished
/// * one reminder on Hades
///
/// # Panics
/// Panics if any of the fixed records is rejected.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn sample_library() -> (Library, Fixture) {
    let mut library = Library::new();
    let sam = library.add_tag(TagCategory::Friend, "Sam").unwrap();
    let alex = library.add_tag(TagCategory::Friend, "Alex").unwrap();
    let coop = library.add_tag(TagCategory::Category, "Co-op").unwrap();
    let roguelike = library.add_tag(TagCategory::Category, "Roguelike").unwrap();
    let playing = library.add_tag(TagCategory::Status, "Playing").unwrap();
    let finished = library.add_tag(TagCategory::Status, "Finished").unwrap();

    let hades = library
        .add_game(NewGame::custom("Hades", "/covers/hades.png"))
        .unwrap();
    let celeste = library
        .add_game(NewGame::custom("Celeste", "/covers/celeste.png"))
        .unwrap();

    let main = default_party(&library, &hades);
    for tag in [&sam, &coop, &playing] {
        library.add_tag_to_party(&hades, &main, tag).unwrap();
    }
    let solo = library.add_party(&hades, Some("Solo")).unwrap();
    for tag in [&alex, &roguelike] {
        library.add_tag_to_party(&hades, &solo, tag).unwrap();
    }

    let celeste_party = default_party(&library, &celeste);
    for tag in [&sam, &finished] {
        library.add_tag_to_party(&celeste, &celeste_party, tag).unwrap();
    }

    library
        .add_reminder(&hades, None, "2026-11-01", "Weekly run with Sam")
        .unwrap();

    let fixture = Fixture {
        sam,
        alex,
        coop,
        roguelike,
        playing,
        finished,
        hades,
        celeste,
    };
    (library, fixture)
}
