use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AutoPlayback;
use crate::database::{StoreError, Tape, TapeStore};
use crate::jellyfin::{JellyfinError, MediaServer, MediaSummary};

/// A single scan request, as posted by the NFC reader page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// The playback target actually used, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Terminal outcome of one resolution call. Serializes to the wire contract:
/// `{"outcome": "validated", "tape": ..., "media": ...}` and friends.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Token unknown; nothing was logged.
    NotFound,
    /// Tape and media found, no playback attempted (or best-effort playback
    /// came up empty). The caller must supply a target to actually play.
    Validated { tape: Tape, media: MediaSummary },
    /// Play command accepted by the target session.
    PlaybackStarted {
        tape: Tape,
        media: MediaSummary,
        session: SessionRef,
    },
    /// An explicitly requested target could not be driven.
    PlaybackFailed {
        tape: Tape,
        media: MediaSummary,
        reason: String,
    },
}

/// Hard failures that abort resolution. Everything else is an outcome.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("token is required")]
    InvalidInput,

    /// Tape exists but its media item cannot be fetched. No playback target
    /// can be formed without it. The scan is already on the record.
    #[error("media item {item_id} is unavailable: {source}")]
    MediaUnavailable {
        item_id: String,
        #[source]
        source: JellyfinError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves a scanned token to a playback target.
///
/// Strategies are tried in strict priority order, short-circuiting on the
/// first applicable one: explicit session, explicit user, automatic
/// selection, otherwise plain validation. Explicit targets are hard
/// requests; their failures surface as [`ScanOutcome::PlaybackFailed`].
/// Automatic selection is best-effort and falls back to
/// [`ScanOutcome::Validated`] on any failure.
pub struct ScanResolver {
    store: TapeStore,
    media: Arc<dyn MediaServer>,
    auto: AutoPlayback,
}

impl ScanResolver {
    pub fn new(store: TapeStore, media: Arc<dyn MediaServer>, auto: AutoPlayback) -> Self {
        Self { store, media, auto }
    }

    /// Resolve one scan. Stateless per call; no retries anywhere.
    pub async fn resolve(&self, request: &ScanRequest) -> Result<ScanOutcome, ScanError> {
        let token = request.token.as_deref().map(str::trim).unwrap_or("");
        if token.is_empty() {
            return Err(ScanError::InvalidInput);
        }

        let Some(tape) = self.store.find_by_token(token).await? else {
            info!(token, "scan token not found");
            return Ok(ScanOutcome::NotFound);
        };
        info!(token, tape_id = tape.id, title = %tape.title, "scan matched tape");

        // The scan goes on the record before any playback attempt;
        // "was scanned" is independent of "did it play".
        self.store.record_scan(tape.id).await?;

        let media: MediaSummary = self
            .media
            .get_item(&tape.media_item_id)
            .await
            .map_err(|source| ScanError::MediaUnavailable {
                item_id: tape.media_item_id.clone(),
                source,
            })?
            .into();

        if let Some(session_id) = request.session_id.as_deref() {
            return Ok(self.play_on_session(tape, media, session_id).await);
        }

        if let Some(user_id) = request.user_id.as_deref() {
            return Ok(self.play_for_user(tape, media, user_id).await);
        }

        if self.auto.enabled && self.auto.auto_select_session {
            return Ok(self.play_auto(tape, media).await);
        }

        Ok(ScanOutcome::Validated { tape, media })
    }

    /// Explicit session: a hard request, no fallback to other strategies.
    async fn play_on_session(
        &self,
        tape: Tape,
        media: MediaSummary,
        session_id: &str,
    ) -> ScanOutcome {
        match self.media.send_play(session_id, &tape.media_item_id).await {
            Ok(()) => ScanOutcome::PlaybackStarted {
                tape,
                media,
                session: SessionRef {
                    id: session_id.to_string(),
                    device_name: None,
                    user: None,
                },
            },
            Err(e) => {
                warn!(session_id, error = %e, "explicit session playback failed");
                ScanOutcome::PlaybackFailed {
                    tape,
                    media,
                    reason: format!("Failed to start playback on device: {}", e),
                }
            }
        }
    }

    /// Explicit user: first active session wins, in server order.
    async fn play_for_user(&self, tape: Tape, media: MediaSummary, user_id: &str) -> ScanOutcome {
        let sessions = match self.media.sessions_for_user(user_id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(user_id, error = %e, "session enumeration failed");
                return ScanOutcome::PlaybackFailed {
                    tape,
                    media,
                    reason: format!("Failed to start playback: {}", e),
                };
            }
        };

        let Some(session) = sessions.into_iter().next() else {
            return ScanOutcome::PlaybackFailed {
                tape,
                media,
                reason: "No active sessions found for this user".to_string(),
            };
        };

        match self.media.send_play(&session.id, &tape.media_item_id).await {
            Ok(()) => ScanOutcome::PlaybackStarted {
                tape,
                media,
                session: SessionRef {
                    id: session.id,
                    device_name: session.device_name,
                    user: None,
                },
            },
            Err(e) => {
                warn!(user_id, session_id = %session.id, error = %e, "user session playback failed");
                ScanOutcome::PlaybackFailed {
                    tape,
                    media,
                    reason: format!("Failed to start playback: {}", e),
                }
            }
        }
    }

    /// Automatic selection: best-effort. Any failure degrades silently to
    /// `Validated`; a valid token always gets a successful response.
    async fn play_auto(&self, tape: Tape, media: MediaSummary) -> ScanOutcome {
        match self.try_auto_select(&tape).await {
            Ok(Some(session)) => ScanOutcome::PlaybackStarted {
                tape,
                media,
                session,
            },
            Ok(None) => ScanOutcome::Validated { tape, media },
            Err(e) => {
                warn!(error = %e, "auto playback failed, returning validation only");
                ScanOutcome::Validated { tape, media }
            }
        }
    }

    async fn try_auto_select(&self, tape: &Tape) -> Result<Option<SessionRef>, JellyfinError> {
        let users = self.media.list_users().await?;
        if users.is_empty() {
            info!("no Jellyfin users, skipping auto playback");
            return Ok(None);
        }

        // Configured default user if present among the enumerated users,
        // else the first. Deterministic but essentially arbitrary.
        let target_user = self
            .auto
            .default_user_id
            .as_deref()
            .and_then(|id| users.iter().find(|u| u.id == id))
            .unwrap_or(&users[0]);
        info!(user = %target_user.name, user_id = %target_user.id, "auto playback user selected");

        let sessions = self.media.list_sessions().await?;
        let Some(session) = sessions
            .into_iter()
            .find(|s| s.is_idle_target_for(&target_user.id))
        else {
            info!("no idle controllable sessions for auto playback");
            return Ok(None);
        };

        info!(session_id = %session.id, device = ?session.device_name, "auto playback target selected");
        self.media.send_play(&session.id, &tape.media_item_id).await?;

        Ok(Some(SessionRef {
            id: session.id,
            device_name: session.device_name,
            user: Some(target_user.name.clone()),
        }))
    }
}
