use super::google_calendar::IFreeBusyProvider;
use crate::repos::IFreeBusyCacheRepo;
use nudge_domain::{
    find_busy_interval_at, is_cache_fresh, normalize_busy_intervals, BusyInterval,
    FreeBusyCacheEntry, FREEBUSY_CACHE_TTL_MILLIS, FREEBUSY_COVERAGE_MILLIS, ID,
};
use std::sync::Arc;
use tracing::debug;

/// Answers whether a user's calendar is busy at an instant
#[async_trait::async_trait]
pub trait ICalendarBusyLookup: Send + Sync {
    async fn busy_interval_at(
        &self,
        user_id: &ID,
        at: i64,
        now: i64,
    ) -> anyhow::Result<Option<BusyInterval>>;

    async fn is_busy_at(&self, user_id: &ID, at: i64, now: i64) -> anyhow::Result<bool> {
        Ok(self.busy_interval_at(user_id, at, now).await?.is_some())
    }
}

/// Busy lookup backed by a per user cache of free/busy results. A cache
/// entry is refreshed from the provider when it is older than the TTL or
/// does not cover the requested instant. Refreshes fetch the day following
/// the instant.
pub struct FreeBusyCacheService {
    cache: Arc<dyn IFreeBusyCacheRepo>,
    provider: Arc<dyn IFreeBusyProvider>,
    ttl: i64,
    coverage: i64,
}

impl FreeBusyCacheService {
    pub fn new(cache: Arc<dyn IFreeBusyCacheRepo>, provider: Arc<dyn IFreeBusyProvider>) -> Self {
        Self {
            cache,
            provider,
            ttl: FREEBUSY_CACHE_TTL_MILLIS,
            coverage: FREEBUSY_COVERAGE_MILLIS,
        }
    }

    async fn load(&self, user_id: &ID, at: i64, now: i64) -> anyhow::Result<FreeBusyCacheEntry> {
        if let Some(entry) = self.cache.find(user_id).await? {
            if is_cache_fresh(&entry, at, at, now, self.ttl) {
                return Ok(entry);
            }
        }

        let window_start = at;
        let window_end = at + self.coverage;

        debug!("Refreshing free/busy cache for user: {}", user_id);
        let raw = self
            .provider
            .fetch_free_busy(user_id, window_start, window_end)
            .await?;
        let entry = FreeBusyCacheEntry {
            user_id: user_id.clone(),
            busy: normalize_busy_intervals(&raw),
            time_min: window_start,
            time_max: window_end,
            fetched_at: now,
        };
        self.cache.save(&entry).await?;
        Ok(entry)
    }
}

#[async_trait::async_trait]
impl ICalendarBusyLookup for FreeBusyCacheService {
    async fn busy_interval_at(
        &self,
        user_id: &ID,
        at: i64,
        now: i64,
    ) -> anyhow::Result<Option<BusyInterval>> {
        let entry = self.load(user_id, at, now).await?;
        Ok(find_busy_interval_at(&entry.busy, at).copied())
    }
}
