//! Starter board configuration loading from config.toml
//!
//! The tags and settings defined in config.toml seed a board on first run, before the
//! user has saved anything. Existing boards are never touched.

use crate::{
    core::{
        data_store::DataStore,
        library::Library,
        settings_store::{Settings, SettingsStore},
    },
    errors::{Error, Result},
    models::{CategoryMap, TagCategory},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_VAR: &str = "BOARD_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Tags every new board starts with
    #[serde(default)]
    pub tags: Vec<TagConfig>,
    /// Preferences every new board starts with
    #[serde(default)]
    pub settings: Settings,
}

/// Configuration for a single starter tag
#[derive(Debug, Deserialize, Clone)]
pub struct TagConfig {
    /// Category the tag belongs to (`friend`, `category` or `status`)
    pub category: TagCategory,
    /// Display name
    pub name: String,
}

/// Loads the board configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A tag names an unknown category
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from `$BOARD_CONFIG`, or ./config.toml when unset
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

/// Builds a fresh board holding the configured starter tags and settings.
///
/// Tags that are rejected (blank or duplicate names) are skipped with a warning.
#[instrument(skip(config))]
#[must_use]
pub fn seed_library(config: &Config) -> Library {
    info!(
        "Seeding a new board. Found {} starter tags from TOML.",
        config.tags.len()
    );
    let mut data = DataStore::new();
    for tag in &config.tags {
        debug!("Processing starter tag '{}' ({})", tag.name, tag.category);
        if data.tag_by_name(tag.category, &tag.name).is_some() {
            warn!("Starter tag '{}' is listed twice, skipping.", tag.name);
            continue;
        }
        if let Err(e) = data.add_tag(tag.category, &tag.name) {
            warn!("Skipping starter tag '{}': {}", tag.name, e);
        }
    }
    Library::from_parts(
        data,
        SettingsStore::with_settings(config.settings.clone(), CategoryMap::default()),
    )
}
