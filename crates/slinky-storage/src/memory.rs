use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use slinky_core::repository::{Repository, Result, SaveOutcome, UrlRecord};
use slinky_core::{Slug, StorageError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// In-memory implementation of the repository contract.
///
/// Expired rows are kept until [`save`](Repository::save) replaces them or
/// [`purge_expired`](Repository::purge_expired) sweeps them, mirroring how
/// a durable table behaves between reaper runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    rows: Arc<DashMap<Slug, UrlRecord>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows held, expired ones included.
    pub fn physical_len(&self) -> usize {
        self.rows.len()
    }

    /// Inserts a row as-is, bypassing every check. For seeding tests.
    pub fn insert_raw(&self, record: UrlRecord) {
        self.rows.insert(record.slug.clone(), record);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Unavailable("repository is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save(&self, record: &UrlRecord) -> Result<SaveOutcome> {
        self.ensure_open()?;
        let now = Timestamp::now();

        if self
            .rows
            .remove_if(&record.slug, |_, row| !row.is_live_at(now))
            .is_some()
        {
            debug!(slug = %record.slug, "Removed expired row before insert");
        }

        match self.rows.entry(record.slug.clone()) {
            Entry::Occupied(_) => Ok(SaveOutcome::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                trace!(slug = %record.slug, "Inserted row");
                Ok(SaveOutcome::Created)
            }
        }
    }

    async fn get(&self, slug: &Slug) -> Result<Option<UrlRecord>> {
        self.ensure_open()?;
        let now = Timestamp::now();
        Ok(self
            .rows
            .get(slug)
            .filter(|row| row.is_live_at(now))
            .map(|row| row.value().clone()))
    }

    async fn exists(&self, slug: &Slug) -> Result<bool> {
        Ok(self.get(slug).await?.is_some())
    }

    async fn purge_expired(&self) -> Result<u64> {
        self.ensure_open()?;
        let now = Timestamp::now();
        let before = self.rows.len();
        self.rows.retain(|_, row| row.is_live_at(now));
        Ok(before.saturating_sub(self.rows.len()) as u64)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
