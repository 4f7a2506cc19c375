use std::sync::Arc;

use crate::cache::AppCache;
use crate::config::Settings;
use crate::db::Pool;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub cache: AppCache,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: Pool, cache: AppCache, settings: Settings) -> Self {
        Self {
            pool,
            cache,
            settings: Arc::new(settings),
        }
    }
}
