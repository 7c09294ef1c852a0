use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use vhs_tap_api::config::AppConfig;
use vhs_tap_api::handlers;
use vhs_tap_api::jellyfin::JellyfinClient;
use vhs_tap_api::state::AppState;
use vhs_tap_api::database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JELLYFIN_URL, DB_PATH, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!(
        db = %config.database_path,
        jellyfin = %config.jellyfin.url,
        auto_playback = config.auto_playback.enabled,
        "starting vhs-tap-api"
    );

    let pool = database::connect(&config.database_path).await?;
    let media = Arc::new(JellyfinClient::new(
        config.jellyfin.url.clone(),
        config.jellyfin.api_key.clone(),
    ));

    let port = config.port;
    let state = AppState::new(config, pool, media);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/config", get(handlers::config_get))
        .route("/api/scan", post(handlers::scan_post))
        .route(
            "/api/tapes",
            get(handlers::tape_list).post(handlers::tape_post),
        )
        .route(
            "/api/tapes/:id",
            get(handlers::tape_get)
                .put(handlers::tape_put)
                .delete(handlers::tape_delete),
        )
        .route("/api/tapes/search/movies", get(handlers::movie_search))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "VHS Tap API",
            "version": version,
            "description": "Maps NFC-tagged VHS tapes to Jellyfin playback",
            "endpoints": {
                "health": "/health (public)",
                "config": "/api/config (public)",
                "scan": "/api/scan (public - POST token to resolve and play)",
                "tapes": "/api/tapes[/:id] (reads public, writes require admin auth)",
                "movies": "/api/tapes/search/movies (admin)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
