use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AdminAuth;
use crate::database::{NewTape, TapeUpdate};
use crate::error::ApiError;
use crate::jellyfin::MediaSummary;
use crate::state::AppState;

/// GET /api/tapes - all registered tapes, newest first
pub async fn tape_list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let tapes = state.store.list().await?;
    Ok(Json(json!({ "success": true, "data": tapes })))
}

/// GET /api/tapes/:id - single tape with its recent scan history
pub async fn tape_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let tape = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("VHS tape not found"))?;

    let scan_history = state.store.scan_history(id, 10).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "tape": tape,
            "scan_history": scan_history
        }
    })))
}

/// POST /api/tapes - register a new tape (admin)
pub async fn tape_post(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(body): Json<NewTape>,
) -> Result<impl IntoResponse, ApiError> {
    if body.token.trim().is_empty() || body.media_item_id.trim().is_empty() || body.title.trim().is_empty() {
        return Err(ApiError::bad_request(
            "token, media_item_id, and title are required",
        ));
    }

    // The bound item must actually exist before we hand out a token for it.
    state
        .media
        .get_item(&body.media_item_id)
        .await
        .map_err(|e| {
            tracing::warn!(item_id = %body.media_item_id, error = %e, "rejecting tape for unknown movie");
            ApiError::bad_request("Movie not found in Jellyfin")
        })?;

    let tape = state.store.create(&body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "VHS tape created successfully",
            "data": tape
        })),
    ))
}

/// PUT /api/tapes/:id - update a tape (admin)
pub async fn tape_put(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TapeUpdate>,
) -> Result<Json<Value>, ApiError> {
    let current = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("VHS tape not found"))?;

    // Re-verify only when the bound item is actually changing.
    if let Some(media_item_id) = &body.media_item_id {
        if media_item_id != &current.media_item_id {
            state.media.get_item(media_item_id).await.map_err(|e| {
                tracing::warn!(item_id = %media_item_id, error = %e, "rejecting update for unknown movie");
                ApiError::bad_request("Movie not found in Jellyfin")
            })?;
        }
    }

    let tape = state.store.update(id, &body).await?;

    Ok(Json(json!({
        "success": true,
        "message": "VHS tape updated successfully",
        "data": tape
    })))
}

/// DELETE /api/tapes/:id - delete a tape and its scan history (admin)
pub async fn tape_delete(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let tape = state.store.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "VHS tape deleted successfully",
        "data": tape
    })))
}

#[derive(Debug, Deserialize)]
pub struct MovieSearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// GET /api/tapes/search/movies - browse the Jellyfin library (admin)
pub async fn movie_search(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MovieSearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let movies = match query.q.as_deref().filter(|q| !q.is_empty()) {
        Some(term) => state.media.search_movies(term).await?,
        None => state.media.list_movies(query.limit.unwrap_or(100)).await?,
    };

    let movies: Vec<MediaSummary> = movies.into_iter().map(MediaSummary::from).collect();
    Ok(Json(json!({ "success": true, "data": movies })))
}
