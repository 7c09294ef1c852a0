use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::ApiError;
use crate::scan::{ScanOutcome, ScanRequest};
use crate::state::AppState;

/// POST /api/scan - resolve an NFC token and trigger playback
///
/// The response body is the serialized outcome; the status code follows it:
/// 404 for an unknown token, 502 when an explicitly requested target could
/// not be driven, 200 otherwise.
pub async fn scan_post(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.resolver.resolve(&request).await?;

    let status = match &outcome {
        ScanOutcome::NotFound => StatusCode::NOT_FOUND,
        ScanOutcome::PlaybackFailed { .. } => StatusCode::BAD_GATEWAY,
        ScanOutcome::Validated { .. } | ScanOutcome::PlaybackStarted { .. } => StatusCode::OK,
    };

    Ok((status, Json(outcome)))
}
