//! Session configuration module for loading the board owner from environment variables.
//!
//! The signed-in user id keys the local board cache. Without a configured id the board
//! is stored under [`LOCAL_USER_ID`].

/// Environment variable holding the signed-in user id
pub const USER_ID_VAR: &str = "BOARD_USER_ID";

/// Owner used when no user id is configured
pub const LOCAL_USER_ID: &str = "local";

/// Gets the configured user id, falling back to [`LOCAL_USER_ID`].
///
/// Blank values count as unset.
#[must_use]
pub fn get_user_id() -> String {
    user_id_from(std::env::var(USER_ID_VAR).ok())
}

fn user_id_from(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| LOCAL_USER_ID.to_string())
}
