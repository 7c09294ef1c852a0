use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/config - public configuration for the scan page
pub async fn config_get(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "jellyfinUrl": state.config.jellyfin.url
    }))
}
