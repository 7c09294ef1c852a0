use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

/// Errors from the tape registry
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tape not found")]
    NotFound,

    #[error("token already registered: {0}")]
    DuplicateToken(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A registered VHS tape: a physical NFC token bound to a Jellyfin item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tape {
    pub id: i64,
    pub token: String,
    pub media_item_id: String,
    pub title: String,
    pub year: Option<i64>,
    pub cover_art_path: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One row of scan history. Append-only; rows cascade with their tape.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScanRecord {
    pub id: i64,
    pub tape_id: i64,
    pub scanned_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewTape {
    pub token: String,
    pub media_item_id: String,
    pub title: String,
    pub year: Option<i64>,
    pub cover_art_path: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct TapeUpdate {
    pub token: Option<String>,
    pub media_item_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<i64>,
    pub cover_art_path: Option<String>,
}

/// The tape registry: all persistent state this service owns.
#[derive(Clone)]
pub struct TapeStore {
    pool: SqlitePool,
}

impl TapeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Exact-match token lookup. The one call on the scan hot path.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Tape>, StoreError> {
        let tape = sqlx::query_as::<_, Tape>("SELECT * FROM vhs_tapes WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tape)
    }

    /// Append a scan history row. Called exactly once per successful token
    /// lookup, before any playback attempt.
    pub async fn record_scan(&self, tape_id: i64) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO scan_history (tape_id) VALUES (?)")
            .bind(tape_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Tape>, StoreError> {
        let tapes = sqlx::query_as::<_, Tape>("SELECT * FROM vhs_tapes ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(tapes)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Tape>, StoreError> {
        let tape = sqlx::query_as::<_, Tape>("SELECT * FROM vhs_tapes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tape)
    }

    /// Most recent scans for a tape, newest first.
    pub async fn scan_history(&self, tape_id: i64, limit: i64) -> Result<Vec<ScanRecord>, StoreError> {
        let records = sqlx::query_as::<_, ScanRecord>(
            "SELECT * FROM scan_history WHERE tape_id = ? ORDER BY scanned_at DESC, id DESC LIMIT ?",
        )
        .bind(tape_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn create(&self, tape: &NewTape) -> Result<Tape, StoreError> {
        if self.find_by_token(&tape.token).await?.is_some() {
            return Err(StoreError::DuplicateToken(tape.token.clone()));
        }

        let result = sqlx::query(
            "INSERT INTO vhs_tapes (token, media_item_id, title, year, cover_art_path)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&tape.token)
        .bind(&tape.media_item_id)
        .bind(&tape.title)
        .bind(tape.year)
        .bind(&tape.cover_art_path)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or(StoreError::NotFound)
    }

    pub async fn update(&self, id: i64, update: &TapeUpdate) -> Result<Tape, StoreError> {
        let current = self.get(id).await?.ok_or(StoreError::NotFound)?;

        if let Some(token) = &update.token {
            if token != &current.token && self.find_by_token(token).await?.is_some() {
                return Err(StoreError::DuplicateToken(token.clone()));
            }
        }

        sqlx::query(
            "UPDATE vhs_tapes
             SET token = COALESCE(?, token),
                 media_item_id = COALESCE(?, media_item_id),
                 title = COALESCE(?, title),
                 year = COALESCE(?, year),
                 cover_art_path = COALESCE(?, cover_art_path),
                 updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(&update.token)
        .bind(&update.media_item_id)
        .bind(&update.title)
        .bind(update.year)
        .bind(&update.cover_art_path)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await?.ok_or(StoreError::NotFound)
    }

    /// Delete a tape, returning the deleted row. Scan history cascades.
    pub async fn delete(&self, id: i64) -> Result<Tape, StoreError> {
        let tape = self.get(id).await?.ok_or(StoreError::NotFound)?;

        sqlx::query("DELETE FROM vhs_tapes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(tape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;

    fn sample_tape(token: &str) -> NewTape {
        NewTape {
            token: token.to_string(),
            media_item_id: "abc".to_string(),
            title: "Sample Movie".to_string(),
            year: Some(1985),
            cover_art_path: None,
        }
    }

    async fn store() -> TapeStore {
        TapeStore::new(connect_in_memory().await.expect("in-memory db"))
    }

    #[tokio::test]
    async fn create_and_find_by_token() {
        let store = store().await;
        let created = store.create(&sample_tape("VHS-001")).await.unwrap();
        assert_eq!(created.token, "VHS-001");
        assert_eq!(created.title, "Sample Movie");

        let found = store.find_by_token("VHS-001").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(store.find_by_token("VHS-999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_token_is_rejected() {
        let store = store().await;
        store.create(&sample_tape("VHS-001")).await.unwrap();

        let err = store.create(&sample_tape("VHS-001")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateToken(t) if t == "VHS-001"));
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let store = store().await;
        let tape = store.create(&sample_tape("VHS-001")).await.unwrap();

        let updated = store
            .update(
                tape.id,
                &TapeUpdate {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.token, "VHS-001");
        assert_eq!(updated.year, Some(1985));
    }

    #[tokio::test]
    async fn update_rejects_stealing_another_token() {
        let store = store().await;
        store.create(&sample_tape("VHS-001")).await.unwrap();
        let other = store.create(&sample_tape("VHS-002")).await.unwrap();

        let err = store
            .update(
                other.id,
                &TapeUpdate {
                    token: Some("VHS-001".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateToken(_)));
    }

    #[tokio::test]
    async fn delete_cascades_scan_history() {
        let store = store().await;
        let tape = store.create(&sample_tape("VHS-001")).await.unwrap();

        store.record_scan(tape.id).await.unwrap();
        store.record_scan(tape.id).await.unwrap();
        assert_eq!(store.scan_history(tape.id, 10).await.unwrap().len(), 2);

        store.delete(tape.id).await.unwrap();
        assert!(store.get(tape.id).await.unwrap().is_none());
        assert!(store.scan_history(tape.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_tape_is_not_found() {
        let store = store().await;
        let err = store.delete(42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
