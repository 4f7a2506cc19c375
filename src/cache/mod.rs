use moka::future::Cache;
use std::time::Duration;

use crate::config::Settings;
use crate::domain::{Profile, PublicId};
use crate::error::Result;

#[derive(Clone)]
pub struct AppCache {
    /// Profile lookups by public id, keeping the hot ingress path off
    /// the database
    pub profiles: Cache<PublicId, Profile>,
}

impl AppCache {
    pub fn new(settings: &Settings) -> Self {
        let cache_ttl = Duration::from_secs(settings.cache_ttl_secs);
        let max_entries = settings.cache_max_entries;

        Self {
            profiles: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(cache_ttl)
                .build(),
        }
    }

    /// Get or insert a profile by public id. Loader misses (`Ok(None)`)
    /// are not cached; loader errors propagate to the caller.
    pub async fn get_or_insert_profile<F, Fut>(
        &self,
        public_id: PublicId,
        f: F,
    ) -> Result<Option<Profile>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Option<Profile>>>,
    {
        if let Some(profile) = self.profiles.get(&public_id).await {
            return Ok(Some(profile));
        }

        match f().await? {
            Some(profile) => {
                self.profiles.insert(public_id, profile.clone()).await;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Drop a cached profile, forcing the next lookup to hit the
    /// database. Called when status changes so archiving takes effect
    /// within one request.
    pub async fn invalidate_profile(&self, public_id: PublicId) {
        self.profiles.invalidate(&public_id).await;
    }
}
