//! Board snapshot entity - the last saved board of each user.
//! One row per user; the board itself is stored as its JSON text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Board snapshot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board_snapshot")]
pub struct Model {
    /// Owner of the board, the authenticated user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Board schema version at the time of saving
    pub version: String,
    /// Serialized board JSON
    #[sea_orm(column_type = "Text")]
    pub data: String,
    /// When this snapshot was written
    pub saved_at: DateTime,
}

/// `BoardSnapshot` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
