use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::database::TapeStore;
use crate::jellyfin::MediaServer;
use crate::scan::ScanResolver;

/// Shared handler state. Every collaborator is constructed once at process
/// start and injected; nothing here is global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: SqlitePool,
    pub store: TapeStore,
    pub media: Arc<dyn MediaServer>,
    pub resolver: Arc<ScanResolver>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: SqlitePool, media: Arc<dyn MediaServer>) -> Self {
        let store = TapeStore::new(pool.clone());
        let resolver = Arc::new(ScanResolver::new(
            store.clone(),
            media.clone(),
            config.auto_playback.clone(),
        ));
        Self {
            config: Arc::new(config),
            pool,
            store,
            media,
            resolver,
        }
    }
}
