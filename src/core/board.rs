//! Board codec - the persisted JSON shape of a library.
//!
//! Export produces a versioned JSON object. Import is defensive: the top level must be a
//! JSON object, but every tag, game and reminder record is decoded on its own so one bad
//! record is skipped with a warning instead of failing the whole board.
//!
//! Version `"1"` boards predate parties; their games carry `tagIDs` directly and are
//! migrated into a single default party.

use crate::{
    core::{
        data_store::DataStore,
        library::Library,
        settings_store::Settings,
    },
    errors::{Error, Result},
    models::{
        CategoryMap, Game, GameId, Party, PartyId, Reminder, ReminderId, StoreType, TagCategory,
        TagId, game::DEFAULT_PARTY_NAME,
    },
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// Version written by [`Board::from_library`].
pub const BOARD_VERSION: &str = "2";
/// Last version using the flat, party-less game model.
const LEGACY_FLAT_VERSION: &str = "1";

/// Serialized tag body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Category the tag belongs to
    pub category: TagCategory,
    /// Display name
    pub name: String,
}

/// Serialized party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    /// Party id; generated when missing
    #[serde(default = "PartyId::generate")]
    pub id: PartyId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-text note
    #[serde(default)]
    pub note: String,
    /// Tag ids per category
    #[serde(rename = "tagIDs", default)]
    pub tag_ids: CategoryMap<Vec<TagId>>,
}

/// Serialized game body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Display title
    pub title: String,
    /// Cover image reference
    #[serde(rename = "coverImageURL")]
    pub cover_image_url: String,
    /// Alphabetic sort override
    #[serde(default)]
    pub sorting_title: Option<String>,
    /// Store the game comes from
    #[serde(default)]
    pub store_type: StoreType,
    /// Identifier inside the store
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    /// `SteamGridDB` id
    #[serde(rename = "sgdbID", default)]
    pub sgdb_id: Option<u64>,
    /// Parties in display order
    #[serde(default)]
    pub parties: Vec<PartyRecord>,
    /// Flat tag ids of version 1 boards
    #[serde(rename = "tagIDs", default, skip_serializing)]
    pub legacy_tag_ids: Option<CategoryMap<Vec<TagId>>>,
}

/// Serialized reminder body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    /// Due date, `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Message text
    pub message: String,
    /// Owning game
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    /// Owning party for party-scoped reminders
    #[serde(rename = "partyID", default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<PartyId>,
}

/// The full persisted state of a library.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Schema version
    pub version: String,
    /// Friend tags as `[id, body]` pairs
    pub friend: Vec<(TagId, TagRecord)>,
    /// Category tags as `[id, body]` pairs
    pub category: Vec<(TagId, TagRecord)>,
    /// Status tags as `[id, body]` pairs
    pub status: Vec<(TagId, TagRecord)>,
    /// Games as `[id, body]` pairs
    pub games: Vec<(GameId, GameRecord)>,
    /// Reminders as `[id, body]` pairs
    pub reminders: Vec<(ReminderId, ReminderRecord)>,
    /// User preferences
    pub settings: Settings,
    /// Custom tag order per category
    pub tags_custom_order: CategoryMap<Vec<TagId>>,
}

/// Loosely typed top level used while importing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBoard {
    version: Option<String>,
    friend: Vec<Value>,
    category: Vec<Value>,
    status: Vec<Value>,
    games: Vec<Value>,
    reminders: Vec<Value>,
    settings: Option<Value>,
    tags_custom_order: Option<Value>,
}

/// What an import had to skip or repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Version string found in the board
    pub version: Option<String>,
    /// Whether the flat-model migration ran
    pub migrated: bool,
    /// One message per dropped record
    pub skipped: Vec<String>,
    /// Party tag references dropped because the tag does not exist
    pub dropped_tag_refs: usize,
    /// Parties given a fresh id because another game already used theirs
    pub reassigned_party_ids: usize,
}

impl ImportReport {
    fn skip(&mut self, what: &str, index: usize, reason: impl std::fmt::Display) {
        warn!("Skipping {} record #{}: {}", what, index, reason);
        self.skipped.push(format!("{what} #{index}: {reason}"));
    }
}

impl Board {
    /// Captures the current state of a library.
    #[must_use]
    pub fn from_library(library: &Library) -> Self {
        let data = library.data();
        let tags = |category: TagCategory| {
            data.tags(category)
                .iter()
                .map(|t| {
                    (
                        t.id.clone(),
                        TagRecord {
                            category,
                            name: t.name.clone(),
                        },
                    )
                })
                .collect()
        };
        Self {
            version: BOARD_VERSION.to_string(),
            friend: tags(TagCategory::Friend),
            category: tags(TagCategory::Category),
            status: tags(TagCategory::Status),
            games: data
                .games()
                .iter()
                .map(|g| (g.id.clone(), game_record(g)))
                .collect(),
            reminders: data
                .reminders()
                .iter()
                .map(|r| {
                    (
                        r.id.clone(),
                        ReminderRecord {
                            date: r.date,
                            message: r.message.clone(),
                            game_id: r.game_id.clone(),
                            party_id: r.party_id.clone(),
                        },
                    )
                })
                .collect(),
            settings: library.settings().settings().clone(),
            tags_custom_order: library.settings().custom_orders().clone(),
        }
    }

    /// Serializes to a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Into::into)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}

fn game_record(game: &Game) -> GameRecord {
    GameRecord {
        title: game.title.clone(),
        cover_image_url: game.cover_image_url.clone(),
        sorting_title: game.sorting_title.clone(),
        store_type: game.store_type,
        store_id: game.store_id.clone(),
        sgdb_id: game.sgdb_id,
        parties: game
            .parties
            .iter()
            .map(|p| PartyRecord {
                id: p.id.clone(),
                name: p.name.clone(),
                note: p.note.clone(),
                tag_ids: CategoryMap::from_fn(|c| p.tag_ids[c].iter().cloned().collect()),
            })
            .collect(),
        legacy_tag_ids: None,
    }
}

fn party_from_record(record: PartyRecord) -> Party {
    Party {
        id: record.id,
        name: if record.name.trim().is_empty() {
            DEFAULT_PARTY_NAME.to_string()
        } else {
            record.name
        },
        note: record.note,
        tag_ids: CategoryMap::from_fn(|c| {
            record.tag_ids[c].iter().cloned().collect::<BTreeSet<_>>()
        }),
    }
}

fn decode_records<T: DeserializeOwned>(
    values: Vec<Value>,
    what: &str,
    report: &mut ImportReport,
) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                report.skip(what, index, e);
                None
            }
        })
        .collect()
}

/// Decoded board contents ready to become a [`Library`].
pub struct DecodedBoard {
    /// Tags, games and reminders
    pub data: DataStore,
    /// User preferences
    pub settings: Settings,
    /// Custom tag orders, restricted to tags that exist
    pub custom_order: CategoryMap<Vec<TagId>>,
    /// What had to be skipped or repaired
    pub report: ImportReport,
}

/// Decodes a board JSON value, skipping malformed records.
#[instrument(skip(value))]
pub fn decode_board(value: Value) -> Result<DecodedBoard> {
    if !value.is_object() {
        return Err(Error::MalformedImport {
            message: "board must be a JSON object".to_string(),
        });
    }
    let raw: RawBoard = serde_json::from_value(value).map_err(|e| Error::MalformedImport {
        message: format!("board top level is malformed: {e}"),
    })?;

    let legacy = raw.version.as_deref() == Some(LEGACY_FLAT_VERSION);
    let mut report = ImportReport {
        version: raw.version.clone(),
        migrated: legacy,
        ..ImportReport::default()
    };
    match raw.version.as_deref() {
        Some(BOARD_VERSION) => {}
        Some(LEGACY_FLAT_VERSION) => info!("Migrating version 1 board to the party model"),
        other => warn!("Unknown board version {:?}, loading best-effort", other),
    }

    let mut data = DataStore::new();
    let tag_arrays = [
        (TagCategory::Friend, raw.friend),
        (TagCategory::Category, raw.category),
        (TagCategory::Status, raw.status),
    ];
    for (category, values) in tag_arrays {
        let records: Vec<(TagId, TagRecord)> =
            decode_records(values, category.as_str(), &mut report);
        for (index, (id, record)) in records.into_iter().enumerate() {
            if record.category != category {
                report.skip(
                    category.as_str(),
                    index,
                    format!("tag '{}' is filed under {}", record.name, record.category),
                );
                continue;
            }
            if let Err(e) = data.restore_tag(id, category, &record.name) {
                report.skip(category.as_str(), index, e);
            }
        }
    }

    let games: Vec<(GameId, GameRecord)> = decode_records(raw.games, "game", &mut report);
    let mut party_remaps: HashMap<GameId, HashMap<PartyId, PartyId>> = HashMap::new();
    for (index, (id, record)) in games.into_iter().enumerate() {
        let mut parties: Vec<Party> = record.parties.into_iter().map(party_from_record).collect();
        if let Some(flat) = record.legacy_tag_ids {
            if parties.is_empty() {
                parties.push(party_from_record(PartyRecord {
                    id: PartyId::generate(),
                    name: DEFAULT_PARTY_NAME.to_string(),
                    note: String::new(),
                    tag_ids: flat,
                }));
            }
        }
        let game = Game {
            id,
            title: record.title,
            sorting_title: record.sorting_title,
            cover_image_url: record.cover_image_url,
            store_type: record.store_type,
            store_id: record.store_id,
            sgdb_id: record.sgdb_id,
            parties,
        };
        match data.restore_game(game) {
            Ok(restored) => {
                report.dropped_tag_refs += restored.dropped_tag_refs;
                report.reassigned_party_ids += restored.remapped_parties.len();
                if !restored.remapped_parties.is_empty() {
                    party_remaps.insert(restored.id, restored.remapped_parties);
                }
            }
            Err(e) => report.skip("game", index, e),
        }
    }

    let reminders: Vec<(ReminderId, ReminderRecord)> =
        decode_records(raw.reminders, "reminder", &mut report);
    for (index, (id, record)) in reminders.into_iter().enumerate() {
        let party_id = record.party_id.map(|party_id| {
            party_remaps
                .get(&record.game_id)
                .and_then(|remap| remap.get(&party_id))
                .cloned()
                .unwrap_or(party_id)
        });
        let reminder = Reminder {
            id,
            date: record.date,
            message: record.message,
            game_id: record.game_id,
            party_id,
        };
        if let Err(e) = data.insert_reminder(reminder) {
            report.skip("reminder", index, e);
        }
    }

    let settings = match raw.settings.map(serde_json::from_value::<Settings>) {
        None => Settings::default(),
        Some(Ok(settings)) => settings,
        Some(Err(e)) => {
            report.skip("settings", 0, e);
            Settings::default()
        }
    };

    let custom_order = match raw
        .tags_custom_order
        .map(serde_json::from_value::<CategoryMap<Vec<TagId>>>)
    {
        None => CategoryMap::default(),
        Some(Ok(order)) => order,
        Some(Err(e)) => {
            report.skip("tagsCustomOrder", 0, e);
            CategoryMap::default()
        }
    };
    let custom_order = CategoryMap::from_fn(|c| {
        custom_order[c]
            .iter()
            .filter(|id| data.find_tag_category(id) == Some(c))
            .cloned()
            .collect()
    });

    info!(
        "Decoded board: {} games, {} tags, {} reminders, {} records skipped",
        data.games().len(),
        data.all_tags().count(),
        data.reminders().len(),
        report.skipped.len()
    );
    Ok(DecodedBoard {
        data,
        settings,
        custom_order,
        report,
    })
}

impl Library {
    /// Replaces this library with the contents of a board JSON value.
    pub fn load_board_value(&mut self, value: Value) -> Result<ImportReport> {
        let decoded = decode_board(value)?;
        self.replace(decoded.data, decoded.settings, decoded.custom_order);
        Ok(decoded.report)
    }

    /// Replaces this library with the contents of a board JSON string.
    pub fn load_board_json(&mut self, json: &str) -> Result<ImportReport> {
        let value: Value = serde_json::from_str(json).map_err(|e| Error::MalformedImport {
            message: format!("board is not valid JSON: {e}"),
        })?;
        self.load_board_value(value)
    }

    /// Serializes the library to a board JSON value.
    pub fn to_board_value(&self) -> Result<Value> {
        Board::from_library(self).to_value()
    }
}

/// File name used for exports taken at `now`.
#[must_use]
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("game-board-{}.json", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes the board into `dir` under a timestamped name and returns the path.
#[instrument(skip(library))]
pub fn export_to_dir(library: &Library, dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(export_file_name(now));
    let json = Board::from_library(library).to_json()?;
    std::fs::write(&path, json)?;
    info!("Exported board to {:?}", path);
    Ok(path)
}

/// Replaces the library with a previously exported file.
#[instrument(skip(library))]
pub fn import_from_file(library: &mut Library, path: &Path) -> Result<ImportReport> {
    let json = std::fs::read_to_string(path)?;
    let report = library.load_board_json(&json)?;
    info!("Imported board from {:?}", path);
    Ok(report)
}
