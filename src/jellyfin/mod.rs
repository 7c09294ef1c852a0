pub mod client;

pub use client::JellyfinClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JellyfinError {
    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("no Jellyfin users available")]
    NoUsers,

    #[error("Jellyfin rejected the request with status {0}")]
    Rejected(reqwest::StatusCode),

    #[error("Jellyfin request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A playable library item, as Jellyfin reports it on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub production_year: Option<i64>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// Client-facing projection of a media item.
#[derive(Debug, Clone, Serialize)]
pub struct MediaSummary {
    pub id: String,
    pub title: String,
    pub year: Option<i64>,
    pub overview: Option<String>,
}

impl From<MediaItem> for MediaSummary {
    fn from(item: MediaItem) -> Self {
        Self {
            id: item.id,
            title: item.name,
            year: item.production_year,
            overview: item.overview,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinUser {
    pub id: String,
    pub name: String,
}

/// A live device session. Ephemeral; known only to Jellyfin at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JellyfinSession {
    pub id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub supports_remote_control: bool,
    #[serde(default)]
    pub now_playing_item: Option<serde_json::Value>,
}

impl JellyfinSession {
    /// Eligible as an auto-selection target for `user_id`: remotely
    /// controllable, owned by that user, and not already playing something.
    pub fn is_idle_target_for(&self, user_id: &str) -> bool {
        self.supports_remote_control
            && self.user_id.as_deref() == Some(user_id)
            && self.now_playing_item.is_none()
    }
}

/// The media server surface the resolver and admin handlers consume.
/// Implemented over HTTP by [`JellyfinClient`]; tests substitute a fake.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// Fetch a single library item by id.
    async fn get_item(&self, item_id: &str) -> Result<MediaItem, JellyfinError>;

    /// All users known to the server.
    async fn list_users(&self) -> Result<Vec<JellyfinUser>, JellyfinError>;

    /// Active sessions for one user, in server order.
    async fn sessions_for_user(&self, user_id: &str)
        -> Result<Vec<JellyfinSession>, JellyfinError>;

    /// All active sessions system-wide, in server order.
    async fn list_sessions(&self) -> Result<Vec<JellyfinSession>, JellyfinError>;

    /// Tell a session to start playing an item now. Non-idempotent remote
    /// call; no retry anywhere in this crate.
    async fn send_play(&self, session_id: &str, item_id: &str) -> Result<(), JellyfinError>;

    /// Search the movie library by title (admin surface).
    async fn search_movies(&self, term: &str) -> Result<Vec<MediaItem>, JellyfinError>;

    /// List movies alphabetically, up to `limit` (admin surface).
    async fn list_movies(&self, limit: u32) -> Result<Vec<MediaItem>, JellyfinError>;
}
