use crate::error::ShortenerError;
use crate::repository::UrlRecord;
use crate::slug::Slug;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

type Result<T> = std::result::Result<T, ShortenerError>;

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, Default)]
pub enum ExpirationPolicy {
    /// Expires after the service's configured number of days.
    #[default]
    Default,
    /// Expires after a certain duration from now.
    AfterDuration(SignedDuration),
    /// Expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct CreateParams {
    /// The URL the slug will redirect to.
    pub target_url: String,
    /// Optional caller-chosen slug. Empty strings are treated as absent.
    pub slug: Option<String>,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
}

impl CreateParams {
    /// Parameters for a generated slug with the default expiry.
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            slug: None,
            expiration: ExpirationPolicy::Default,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns the slug it was stored under.
    async fn create(&self, params: CreateParams) -> Result<Slug>;

    /// Resolves a slug to its live record.
    /// Fails with [`ShortenerError::NotFound`] if it does not exist or has expired.
    async fn resolve(&self, slug: &str) -> Result<UrlRecord>;

    /// Closes the underlying stores.
    async fn shutdown(&self) -> Result<()>;
}
