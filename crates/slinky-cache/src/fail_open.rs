use slinky_core::{Slug, UrlCache, UrlRecord};
use tracing::warn;

/// Wraps a [`UrlCache`] so that no cache failure ever reaches the caller.
///
/// Reads that fail behave like misses and writes that fail are dropped.
/// Each swallowed error is logged at `warn` with the operation and slug.
#[derive(Debug, Clone)]
pub struct FailOpenCache<C> {
    inner: C,
}

impl<C: UrlCache> FailOpenCache<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub async fn get_url(&self, slug: &Slug) -> Option<UrlRecord> {
        match self.inner.get_url(slug).await {
            Ok(record) => record,
            Err(e) => {
                warn!(slug = %slug, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn exists(&self, slug: &Slug) -> bool {
        match self.inner.exists(slug).await {
            Ok(found) => found,
            Err(e) => {
                warn!(slug = %slug, error = %e, "Cache existence check failed, treating as miss");
                false
            }
        }
    }

    pub async fn set_url(&self, record: &UrlRecord) {
        if let Err(e) = self.inner.set_url(record).await {
            warn!(slug = %record.slug, error = %e, "Cache write failed, skipping");
        }
    }

    pub async fn close(&self) {
        if let Err(e) = self.inner.close().await {
            warn!(error = %e, "Failed to close cache");
        }
    }
}
