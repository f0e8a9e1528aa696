/// Tags, games, parties and reminders with their invariants
pub mod data_store;

/// Search text, selections, exclusions and the filter predicate
pub mod filter_store;

/// Combination modes, sort preferences and custom tag orders
pub mod settings_store;

/// Watch-and-sort reactions and their comparators
pub mod sorting;

/// Top-level service wiring the stores together
pub mod library;

/// Persisted board JSON, import and export
pub mod board;

/// Per-user board snapshots in the local database
pub mod local_store;

/// Modal dialog stack
pub mod dialog_stack;

/// Stale async result guard
pub mod request_guard;
