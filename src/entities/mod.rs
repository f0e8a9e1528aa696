//! Entity module - Contains the SeaORM entity definitions for the local board cache.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod board_snapshot;

pub use board_snapshot::{
    ActiveModel as BoardSnapshotActiveModel, Column as BoardSnapshotColumn,
    Entity as BoardSnapshot, Model as BoardSnapshotModel,
};
