use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{JellyfinError, JellyfinSession, JellyfinUser, MediaItem, MediaServer};

/// HTTP client for a Jellyfin server, authenticated with an API key.
/// Constructed once at process start and shared behind `Arc<dyn MediaServer>`.
pub struct JellyfinClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Envelope for paged /Items responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsPage {
    #[serde(default)]
    items: Vec<MediaItem>,
}

impl JellyfinClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.url(path))
            .header("X-Emby-Token", &self.api_key)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .header("X-Emby-Token", &self.api_key)
    }
}

#[async_trait]
impl MediaServer for JellyfinClient {
    async fn get_item(&self, item_id: &str) -> Result<MediaItem, JellyfinError> {
        // Item lookups are scoped to a user; any user will do.
        let users = self.list_users().await?;
        let user = users.first().ok_or(JellyfinError::NoUsers)?;

        let response = self
            .get(&format!("/Users/{}/Items/{}", user.id, item_id))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(JellyfinError::ItemNotFound(item_id.to_string()));
        }
        let item = response.error_for_status()?.json::<MediaItem>().await?;
        Ok(item)
    }

    async fn list_users(&self) -> Result<Vec<JellyfinUser>, JellyfinError> {
        let users = self
            .get("/Users")
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<JellyfinUser>>()
            .await?;
        Ok(users)
    }

    async fn sessions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<JellyfinSession>, JellyfinError> {
        let sessions = self
            .get("/Sessions")
            .query(&[("userId", user_id)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<JellyfinSession>>()
            .await?;
        Ok(sessions)
    }

    async fn list_sessions(&self) -> Result<Vec<JellyfinSession>, JellyfinError> {
        let sessions = self
            .get("/Sessions")
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<JellyfinSession>>()
            .await?;
        Ok(sessions)
    }

    async fn send_play(&self, session_id: &str, item_id: &str) -> Result<(), JellyfinError> {
        debug!(session_id, item_id, "sending play command");

        let response = self
            .post(&format!("/Sessions/{}/Playing", session_id))
            .json(&json!({
                "ItemIds": [item_id],
                "PlayCommand": "PlayNow",
                "StartPositionTicks": 0
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(JellyfinError::Rejected(response.status()));
        }
        Ok(())
    }

    async fn search_movies(&self, term: &str) -> Result<Vec<MediaItem>, JellyfinError> {
        let page = self
            .get("/Items")
            .query(&[
                ("searchTerm", term),
                ("IncludeItemTypes", "Movie"),
                ("Recursive", "true"),
                ("Fields", "Overview,ProductionYear"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<ItemsPage>()
            .await?;
        Ok(page.items)
    }

    async fn list_movies(&self, limit: u32) -> Result<Vec<MediaItem>, JellyfinError> {
        let limit = limit.to_string();
        let page = self
            .get("/Items")
            .query(&[
                ("IncludeItemTypes", "Movie"),
                ("Recursive", "true"),
                ("Fields", "Overview,ProductionYear"),
                ("SortBy", "SortName"),
                ("SortOrder", "Ascending"),
                ("Limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<ItemsPage>()
            .await?;
        Ok(page.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped_from_base_url() {
        let client = JellyfinClient::new("http://localhost:8096//", "key");
        assert_eq!(client.url("/Users"), "http://localhost:8096/Users");
    }

    #[test]
    fn session_wire_format_deserializes() {
        let session: JellyfinSession = serde_json::from_value(json!({
            "Id": "sess-1",
            "DeviceName": "Living Room TV",
            "UserId": "user-1",
            "SupportsRemoteControl": true
        }))
        .unwrap();

        assert_eq!(session.id, "sess-1");
        assert_eq!(session.device_name.as_deref(), Some("Living Room TV"));
        assert!(session.is_idle_target_for("user-1"));
        assert!(!session.is_idle_target_for("user-2"));
    }

    #[test]
    fn playing_session_is_not_an_idle_target() {
        let session: JellyfinSession = serde_json::from_value(json!({
            "Id": "sess-1",
            "UserId": "user-1",
            "SupportsRemoteControl": true,
            "NowPlayingItem": { "Id": "xyz" }
        }))
        .unwrap();

        assert!(!session.is_idle_target_for("user-1"));
    }

    #[test]
    fn items_page_tolerates_missing_items() {
        let page: ItemsPage = serde_json::from_value(json!({ "TotalRecordCount": 0 })).unwrap();
        assert!(page.items.is_empty());
    }
}
