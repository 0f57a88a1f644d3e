use slinky_cache::FailOpenCache;
use slinky_core::repository::{Result, SaveOutcome};
use slinky_core::{Repository, Slug, UrlCache, UrlRecord};
use tracing::{debug, trace};

/// Keeps the durable store and the cache in step.
///
/// The durable store is the source of truth. The cache only ever holds
/// records that were written durably first, and every cache failure is
/// absorbed by [`FailOpenCache`], so errors out of this type are always
/// durable ones.
#[derive(Debug)]
pub struct PersistenceCoordinator<R, C> {
    store: R,
    cache: FailOpenCache<C>,
}

impl<R, C> PersistenceCoordinator<R, C>
where
    R: Repository,
    C: UrlCache,
{
    pub fn new(store: R, cache: C) -> Self {
        Self {
            store,
            cache: FailOpenCache::new(cache),
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn cache(&self) -> &C {
        self.cache.inner()
    }

    /// Persists a new record.
    ///
    /// A cache hit is a definite conflict and skips the durable write. A miss
    /// proves nothing, since the cache may have evicted a live entry, so the
    /// durable store decides.
    pub async fn save(&self, record: &UrlRecord) -> Result<SaveOutcome> {
        let slug = &record.slug;

        if self.cache.exists(slug).await {
            debug!(slug = %slug, "Slug already cached, rejecting");
            return Ok(SaveOutcome::Conflict);
        }

        if self.store.save(record).await? == SaveOutcome::Conflict {
            debug!(slug = %slug, "Slug held by a live durable row");
            return Ok(SaveOutcome::Conflict);
        }

        self.cache.set_url(record).await;
        trace!(slug = %slug, "Record saved");
        Ok(SaveOutcome::Created)
    }

    /// Finds a record, cache first.
    ///
    /// Cache hits are returned as-is; the cache's own TTL already tracks
    /// `expires_at`. Durable hits are written back to the cache.
    pub async fn lookup(&self, slug: &Slug) -> Result<Option<UrlRecord>> {
        if let Some(record) = self.cache.get_url(slug).await {
            return Ok(Some(record));
        }

        let Some(record) = self.store.get(slug).await? else {
            trace!(slug = %slug, "Slug not found in either tier");
            return Ok(None);
        };

        debug!(slug = %slug, "Backfilling cache from durable store");
        self.cache.set_url(&record).await;
        Ok(Some(record))
    }

    /// Whether either tier currently holds the slug.
    pub async fn exists(&self, slug: &Slug) -> Result<bool> {
        if self.cache.exists(slug).await {
            return Ok(true);
        }
        self.store.exists(slug).await
    }

    /// Closes the cache, then the durable store.
    pub async fn close(&self) -> Result<()> {
        self.cache.close().await;
        self.store.close().await
    }
}
