//! Local board cache - the last saved board of each user in `SQLite`.
//!
//! One `board_snapshot` row per user holds the serialized board. Loading goes through the
//! same defensive decoder as file import, so a damaged snapshot still yields a board.

use crate::{
    core::{
        board::{BOARD_VERSION, ImportReport},
        library::Library,
    },
    entities::{BoardSnapshot, board_snapshot},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use tracing::{debug, info, instrument};

/// Loads the saved board of a user, or `None` when nothing was saved yet.
#[instrument(skip(db))]
pub async fn load_board(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<(Library, ImportReport)>> {
    let Some(snapshot) = BoardSnapshot::find_by_id(user_id.to_string()).one(db).await? else {
        debug!("No saved board for {}", user_id);
        return Ok(None);
    };

    let mut library = Library::new();
    let report = library.load_board_json(&snapshot.data)?;
    info!(
        "Loaded board for {} saved at {} ({} records skipped)",
        user_id,
        snapshot.saved_at,
        report.skipped.len()
    );
    Ok(Some((library, report)))
}

/// Writes the board of a user, replacing any earlier snapshot.
#[instrument(skip(db, library))]
pub async fn save_board(
    db: &DatabaseConnection,
    user_id: &str,
    library: &Library,
) -> Result<board_snapshot::Model> {
    let data = serde_json::to_string(&library.to_board_value()?)?;
    let saved_at = Utc::now().naive_utc();

    let existing = BoardSnapshot::find_by_id(user_id.to_string()).one(db).await?;
    let saved = if let Some(existing) = existing {
        let mut snapshot = existing.into_active_model();
        snapshot.version = Set(BOARD_VERSION.to_string());
        snapshot.data = Set(data);
        snapshot.saved_at = Set(saved_at);
        snapshot.update(db).await?
    } else {
        board_snapshot::ActiveModel {
            user_id: Set(user_id.to_string()),
            version: Set(BOARD_VERSION.to_string()),
            data: Set(data),
            saved_at: Set(saved_at),
        }
        .insert(db)
        .await?
    };

    info!("Saved board for {} ({} bytes)", user_id, saved.data.len());
    Ok(saved)
}

/// Deletes the saved board of a user. Returns whether a snapshot existed.
#[instrument(skip(db))]
pub async fn delete_board(db: &DatabaseConnection, user_id: &str) -> Result<bool> {
    let result = BoardSnapshot::delete_by_id(user_id.to_string())
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
