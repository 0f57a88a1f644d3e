use crate::error::CacheError;
use crate::repository::UrlRecord;
use crate::slug::Slug;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A volatile, TTL-evicting cache for URL records.
///
/// Entries are written with a time-to-live equal to the record's remaining
/// lifetime, so presence in the cache implies the record is live and reads
/// never re-check expiry. Implementations report their own failures; the
/// fail-open wrapper in `slinky-cache` decides how to degrade.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get URL record from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, slug: &Slug) -> Result<Option<UrlRecord>>;

    /// Store URL record in cache until its `expires_at`.
    ///
    /// Records that are already expired are not written.
    async fn set_url(&self, record: &UrlRecord) -> Result<()>;

    /// Checks whether the slug is currently cached.
    async fn exists(&self, slug: &Slug) -> Result<bool>;

    /// Remove URL record from cache.
    /// It is not an error if the key does not exist.
    async fn del(&self, slug: &Slug) -> Result<()>;

    /// Remove every entry owned by this cache.
    async fn flush(&self) -> Result<()>;

    /// Release the connection. Calling it again is a no-op.
    async fn close(&self) -> Result<()>;
}
