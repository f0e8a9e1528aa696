//! Backend wire types.
//!
//! The backend only authenticates users and stores one opaque board blob per user.
//! These are the request and response bodies of `GET /auth/me`, `GET /api/board` and
//! `POST /api/board/update`.

use crate::{
    core::{board::ImportReport, library::Library},
    errors::Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current user, `204` when signed out
pub const ME_PATH: &str = "/auth/me";
/// Ends the session
pub const LOGOUT_PATH: &str = "/auth/logout";
/// Erases the account and its board
pub const DELETE_ACCOUNT_PATH: &str = "/auth/deleteAccount";
/// Stored board, `204` before the first upload
pub const BOARD_PATH: &str = "/api/board";
/// Replaces the stored board
pub const BOARD_UPDATE_PATH: &str = "/api/board/update";

const NO_CONTENT: u16 = 204;

/// Sign-in redirect for a provider.
#[must_use]
pub fn login_path(provider: AuthProvider) -> String {
    format!("/auth/{}", provider.as_str())
}

/// Parses a `GET /auth/me` reply. `None` means signed out.
pub fn parse_me(status: u16, body: &str) -> Result<Option<AuthUser>> {
    if status == NO_CONTENT || body.trim().is_empty() {
        return Ok(None);
    }
    let me: MeResponse = serde_json::from_str(body)?;
    Ok(Some(me.user))
}

/// Parses a `GET /api/board` reply. `None` means nothing stored yet.
pub fn parse_board(status: u16, body: &str) -> Result<Option<BoardResponse>> {
    if status == NO_CONTENT || body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body).map(Some).map_err(Into::into)
}

/// Identity provider a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Steam `OpenID`
    Steam,
    /// Google `OAuth`
    Google,
    /// Discord `OAuth`
    Discord,
}

impl AuthProvider {
    /// Path segment used in auth URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Steam => "steam",
            Self::Google => "google",
            Self::Discord => "discord",
        }
    }
}

/// Signed-in user as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend user id, keys the local board cache
    pub id: String,
    /// Provider used to sign in
    pub provider: AuthProvider,
    /// Name shown in the UI
    pub display_name: String,
    /// Avatar image, when the provider has one
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    /// The signed-in user
    pub user: AuthUser,
}

/// Stored board blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBoard {
    /// Board JSON exactly as last uploaded
    pub data: Value,
}

/// Body of `GET /api/board`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardResponse {
    /// The user's board, absent before the first upload
    pub board: Option<StoredBoard>,
}

impl BoardResponse {
    /// Replaces `library` with the downloaded board. Returns `None` when nothing was stored.
    pub fn apply_to(self, library: &mut Library) -> Result<Option<ImportReport>> {
        self.board
            .map(|board| library.load_board_value(board.data))
            .transpose()
    }
}

/// Body of `POST /api/board/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardUpdate {
    /// Board JSON to store
    pub data: Value,
}

impl BoardUpdate {
    /// Serializes the current board for upload.
    pub fn from_library(library: &Library) -> Result<Self> {
        Ok(Self {
            data: library.to_board_value()?,
        })
    }
}
