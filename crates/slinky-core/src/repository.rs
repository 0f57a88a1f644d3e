use crate::error::StorageError;
use crate::slug::Slug;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A shortened URL: the slug, where it points, and when it stops resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub slug: Slug,
    /// The destination the slug redirects to.
    pub target_url: String,
    /// The instant after which the record no longer resolves.
    pub expires_at: Timestamp,
}

impl UrlRecord {
    /// Returns `true` while `now` is strictly before the expiry instant.
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }

    /// Time left until expiry, or `None` once the record is no longer live.
    pub fn remaining_ttl(&self, now: Timestamp) -> Option<Duration> {
        let remaining = self.expires_at.duration_since(now);
        if !remaining.is_positive() {
            return None;
        }
        Duration::try_from(remaining).ok()
    }
}

/// Outcome of persisting a record under its slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    /// A live record already holds the slug.
    Conflict,
}

/// The durable store of record.
///
/// Rows may outlive their expiry until the reaper or the lazy delete in
/// [`save`](Repository::save) removes them, so every read must filter on
/// `expires_at > now`.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Persists a record.
    ///
    /// Any row for the slug that has already expired is deleted first, then
    /// the insert runs under the slug's uniqueness constraint. Returns
    /// [`SaveOutcome::Conflict`] if a live row still holds the slug; a live
    /// row is never overwritten.
    async fn save(&self, record: &UrlRecord) -> Result<SaveOutcome>;

    /// Retrieves the live record for a slug.
    /// Returns `None` if the slug does not exist or has expired.
    async fn get(&self, slug: &Slug) -> Result<Option<UrlRecord>>;

    /// Checks whether a live record holds the slug.
    async fn exists(&self, slug: &Slug) -> Result<bool>;

    /// Deletes every row whose expiry has passed and returns how many went.
    async fn purge_expired(&self) -> Result<u64>;

    /// Releases the underlying connections. Calling it again is a no-op.
    async fn close(&self) -> Result<()>;
}
