use async_trait::async_trait;
use jiff::Timestamp;
use moka::future::Cache;
use moka::Expiry;
use slinky_core::{Slug, UrlCache, UrlRecord};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::Result;

const DEFAULT_CAPACITY: u64 = 10_000;

/// Per-entry expiry: every record lives exactly until its own `expires_at`.
struct RecordExpiry;

impl RecordExpiry {
    fn time_left(record: &UrlRecord) -> Duration {
        record
            .remaining_ttl(Timestamp::now())
            .unwrap_or(Duration::ZERO)
    }
}

impl Expiry<String, UrlRecord> for RecordExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &UrlRecord,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Self::time_left(value))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &UrlRecord,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::time_left(value))
    }
}

/// An in-process cache implementation using Moka.
///
/// Capacity is bounded, so like any real cache it may evict live entries
/// under pressure. Suitable for single-node deployments and as the cache
/// double in tests.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, UrlRecord>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(RecordExpiry)
            .build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, slug: &Slug) -> Result<Option<UrlRecord>> {
        trace!(slug = %slug, "Fetching URL record from Moka cache");

        match self.cache.get(slug.as_str()).await {
            Some(record) => {
                debug!(slug = %slug, "Cache hit in Moka");
                Ok(Some(record))
            }
            None => {
                trace!(slug = %slug, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, record: &UrlRecord) -> Result<()> {
        if record.remaining_ttl(Timestamp::now()).is_none() {
            debug!(slug = %record.slug, "Record already expired, not caching");
            return Ok(());
        }

        self.cache
            .insert(record.slug.as_str().to_string(), record.clone())
            .await;
        debug!(slug = %record.slug, "Cached record in Moka");
        Ok(())
    }

    async fn exists(&self, slug: &Slug) -> Result<bool> {
        Ok(self.cache.get(slug.as_str()).await.is_some())
    }

    async fn del(&self, slug: &Slug) -> Result<()> {
        trace!(slug = %slug, "Removing URL record from Moka cache");
        self.cache.invalidate(slug.as_str()).await;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!("Flushed Moka cache");
        Ok(())
    }

    /// Drops every entry, so a closed cache answers nothing but misses.
    async fn close(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!("Closed Moka cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    fn slug(s: &str) -> Slug {
        Slug::new_unchecked(s)
    }

    fn record(s: &str, url: &str, lifetime: SignedDuration) -> UrlRecord {
        UrlRecord {
            slug: slug(s),
            target_url: url.to_string(),
            expires_at: Timestamp::now() + lifetime,
        }
    }

    #[tokio::test]
    async fn cache_get_and_set() {
        let cache = MokaUrlCache::new();
        let r = record("abc123", "https://example.com", SignedDuration::from_hours(1));

        assert!(cache.get_url(&r.slug).await.unwrap().is_none());

        cache.set_url(&r).await.unwrap();

        assert_eq!(cache.get_url(&r.slug).await.unwrap(), Some(r.clone()));
        assert!(cache.exists(&r.slug).await.unwrap());
    }

    #[tokio::test]
    async fn entry_expires_at_record_expiry() {
        let cache = MokaUrlCache::new();
        let r = record("short", "https://example.com", SignedDuration::from_millis(100));

        cache.set_url(&r).await.unwrap();
        assert!(cache.exists(&r.slug).await.unwrap());

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(!cache.exists(&r.slug).await.unwrap());
        assert!(cache.get_url(&r.slug).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_record_is_not_written() {
        let cache = MokaUrlCache::new();
        let r = record("old", "https://example.com", SignedDuration::from_secs(-5));

        cache.set_url(&r).await.unwrap();

        assert!(!cache.exists(&r.slug).await.unwrap());
    }

    #[tokio::test]
    async fn entries_keep_their_own_lifetime() {
        let cache = MokaUrlCache::new();
        let brief = record("brief", "https://a.example", SignedDuration::from_millis(100));
        let long = record("long", "https://b.example", SignedDuration::from_hours(1));

        cache.set_url(&brief).await.unwrap();
        cache.set_url(&long).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(!cache.exists(&brief.slug).await.unwrap());
        assert!(cache.exists(&long.slug).await.unwrap());
    }

    #[tokio::test]
    async fn del_removes_entry_and_is_idempotent() {
        let cache = MokaUrlCache::new();
        let r = record("abc123", "https://example.com", SignedDuration::from_hours(1));

        cache.set_url(&r).await.unwrap();
        cache.del(&r.slug).await.unwrap();
        assert!(cache.get_url(&r.slug).await.unwrap().is_none());

        cache.del(&r.slug).await.unwrap();
    }

    #[tokio::test]
    async fn flush_drops_everything() {
        let cache = MokaUrlCache::new();
        for i in 0..20 {
            let r = record(
                &format!("code{i}"),
                &format!("https://example{i}.com"),
                SignedDuration::from_hours(1),
            );
            cache.set_url(&r).await.unwrap();
        }

        cache.flush().await.unwrap();

        for i in 0..20 {
            assert!(!cache.exists(&slug(&format!("code{i}"))).await.unwrap());
        }
    }

    #[tokio::test]
    async fn close_drops_entries() {
        let cache = MokaUrlCache::new();
        let r = record("abc123", "https://example.com", SignedDuration::from_hours(1));
        cache.set_url(&r).await.unwrap();

        cache.close().await.unwrap();

        assert!(cache.get_url(&r.slug).await.unwrap().is_none());
        assert!(!cache.exists(&r.slug).await.unwrap());
    }
}
