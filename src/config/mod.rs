/// Database configuration and connection management
pub mod database;

/// Starter tags and default settings from config.toml
pub mod defaults;

/// Session configuration from environment variables
pub mod session;
