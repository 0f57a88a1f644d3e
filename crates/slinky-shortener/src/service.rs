use crate::settings::{SettingsError, ShortenerSettings};
use crate::url;
use async_trait::async_trait;
use jiff::Timestamp;
use slinky_core::{
    CreateParams, ExpirationPolicy, Repository, SaveOutcome, Shortener, ShortenerError, Slug,
    UrlCache, UrlRecord,
};
use slinky_generator::{Generator, RandomGenerator};
use slinky_storage::{PersistenceCoordinator, Reaper, ReaperHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A concrete implementation of the `Shortener` trait.
///
/// Every create runs under one process-wide lock, from picking the slug to
/// the final save, so two creates in this process never both claim the same
/// slug. Resolves never take the lock.
#[derive(Debug)]
pub struct ShortenerService<R, C, G> {
    coordinator: Arc<PersistenceCoordinator<R, C>>,
    generator: Arc<G>,
    settings: ShortenerSettings,
    create_lock: Arc<Mutex<()>>,
    reaper: Arc<Mutex<Option<ReaperHandle>>>,
}

impl<R, C, G> Clone for ShortenerService<R, C, G> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            generator: Arc::clone(&self.generator),
            settings: self.settings.clone(),
            create_lock: Arc::clone(&self.create_lock),
            reaper: Arc::clone(&self.reaper),
        }
    }
}

impl<R, C> ShortenerService<R, C, RandomGenerator>
where
    R: Repository,
    C: UrlCache,
{
    /// Creates a service generating random slugs of `settings.slug_length`.
    ///
    /// Fails if the slug length is unusable or the default lifetime does not
    /// fit in a timestamp.
    pub fn from_settings(
        store: R,
        cache: C,
        settings: ShortenerSettings,
    ) -> Result<Self, SettingsError> {
        settings.check_default_lifetime()?;
        let generator = RandomGenerator::new(settings.slug_length)?;
        Ok(Self::new(store, cache, generator, settings))
    }
}

impl<R, C, G> ShortenerService<R, C, G>
where
    R: Repository,
    C: UrlCache,
    G: Generator,
{
    /// Creates a new `ShortenerService` with a custom generator.
    pub fn new(store: R, cache: C, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            coordinator: Arc::new(PersistenceCoordinator::new(store, cache)),
            generator: Arc::new(generator),
            settings,
            create_lock: Arc::new(Mutex::new(())),
            reaper: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts a [`Reaper`] over the durable store; it stops on
    /// [`shutdown`](Shortener::shutdown).
    pub async fn start_reaper(&self, interval: Duration)
    where
        R: Clone,
    {
        let handle = Reaper::spawn(self.coordinator.store().clone(), interval);
        if let Some(previous) = self.reaper.lock().await.replace(handle) {
            previous.shutdown().await;
        }
    }

    pub fn coordinator(&self) -> &PersistenceCoordinator<R, C> {
        &self.coordinator
    }

    fn expires_at(&self, policy: &ExpirationPolicy) -> Result<Timestamp, ShortenerError> {
        let lifetime = match policy {
            ExpirationPolicy::Default => self.settings.default_lifetime(),
            ExpirationPolicy::AfterDuration(lifetime) => *lifetime,
            ExpirationPolicy::AtTimestamp(at) => return Ok(*at),
        };
        Timestamp::now().checked_add(lifetime).map_err(|e| {
            ShortenerError::InvalidInput(format!("expiry of {lifetime:?} is out of range: {e}"))
        })
    }

    /// Draws candidates until one is unused in both tiers.
    ///
    /// Must be called with the creation lock held.
    async fn next_free_slug(&self) -> Result<Slug, ShortenerError> {
        let mut attempt = 1_u32;
        loop {
            let candidate: Slug = self.generator.generate().into();
            if !self.coordinator.exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!(slug = %candidate, attempt, "Generated slug already in use, retrying");
            attempt += 1;
        }
    }
}

#[async_trait]
impl<R, C, G> Shortener for ShortenerService<R, C, G>
where
    R: Repository,
    C: UrlCache,
    G: Generator,
{
    async fn create(&self, params: CreateParams) -> Result<Slug, ShortenerError> {
        let target_url = url::validate(&params.target_url)?.to_string();
        let requested = match params.slug {
            Some(slug) if !slug.is_empty() => Some(Slug::new(slug)?),
            _ => None,
        };
        let expires_at = self.expires_at(&params.expiration)?;

        let _guard = self.create_lock.lock().await;

        let slug = match requested {
            Some(slug) => slug,
            None => self.next_free_slug().await?,
        };

        let record = UrlRecord {
            slug,
            target_url,
            expires_at,
        };

        match self.coordinator.save(&record).await? {
            SaveOutcome::Created => {
                info!(slug = %record.slug, expires_at = %record.expires_at, "Created short URL");
                Ok(record.slug)
            }
            SaveOutcome::Conflict => {
                debug!(slug = %record.slug, "Slug unavailable");
                Err(ShortenerError::Conflict)
            }
        }
    }

    async fn resolve(&self, slug: &str) -> Result<UrlRecord, ShortenerError> {
        // A string that cannot be a slug cannot have been stored.
        let Ok(slug) = Slug::new(slug) else {
            return Err(ShortenerError::NotFound);
        };

        self.coordinator
            .lookup(&slug)
            .await?
            .ok_or(ShortenerError::NotFound)
    }

    async fn shutdown(&self) -> Result<(), ShortenerError> {
        if let Some(reaper) = self.reaper.lock().await.take() {
            reaper.shutdown().await;
        }
        self.coordinator.close().await?;
        info!("Shortener stopped");
        Ok(())
    }
}
