pub mod store;

pub use store::{NewTape, ScanRecord, StoreError, Tape, TapeStore, TapeUpdate};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

const SCHEMA: &str = include_str!("schema.sql");

/// Open (creating if missing) the SQLite database at `path` and apply the
/// embedded schema. Foreign keys are enabled so scan history cascades with
/// its tape.
pub async fn connect(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(Path::new(path))
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    apply_schema(&pool).await?;

    info!("Database ready at {}", path);
    Ok(pool)
}

/// In-memory database for tests. A single connection keeps every query on
/// the same memory store.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

/// Apply the embedded schema, statement by statement. Every statement is
/// idempotent (IF NOT EXISTS) so this runs on every startup.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
