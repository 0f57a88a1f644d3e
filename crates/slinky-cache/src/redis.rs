use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::RwLock;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use slinky_core::{CacheError, Slug, UrlCache, UrlRecord};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::Result;

const DEFAULT_PREFIX: &str = "sl:url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Records are stored as JSON strings under a configurable key prefix and
/// written with `PSETEX`, so Redis itself evicts each entry at the record's
/// `expires_at`.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        CacheError::Timeout(message)
    } else if err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn: Arc::new(RwLock::new(Some(conn))),
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a client for `redis_url` and connects.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis");

        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("failed to create Redis client", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Unavailable(format!("failed to connect to Redis: {e}")))?;

        Ok(Self::new(conn))
    }

    /// Generates the cache key for a slug.
    fn cache_key(&self, slug: &Slug) -> String {
        format!("{}{}", self.key_prefix, slug.as_str())
    }

    fn connection(&self) -> Result<MultiplexedConnection> {
        self.conn.read().clone().ok_or(CacheError::Closed)
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, slug: &Slug) -> Result<Option<UrlRecord>> {
        let key = self.cache_key(slug);
        trace!(slug = %slug, "Fetching URL record from Redis cache");

        let mut conn = self.connection()?;
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => {
                debug!(slug = %slug, "Cache hit in Redis");
                serde_json::from_str::<UrlRecord>(&cached).map(Some).map_err(|e| {
                    warn!(slug = %slug, error = %e, "Failed to deserialize cached record");
                    CacheError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
                })
            }
            Ok(None) => {
                trace!(slug = %slug, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => Err(map_redis_error("failed to fetch value from Redis", e)),
        }
    }

    async fn set_url(&self, record: &UrlRecord) -> Result<()> {
        let slug = &record.slug;
        let Some(ttl) = record.remaining_ttl(Timestamp::now()) else {
            debug!(slug = %slug, "Record already expired, not caching");
            return Ok(());
        };
        let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if ttl_millis == 0 {
            debug!(slug = %slug, "Record expires within a millisecond, not caching");
            return Ok(());
        }

        let key = self.cache_key(slug);
        trace!(slug = %slug, ttl_millis, "Storing URL record in Redis cache");

        let json = serde_json::to_string(record)
            .map_err(|e| CacheError::Serialization(format!("failed to serialize cache value: {e}")))?;

        let mut conn = self.connection()?;
        conn.pset_ex::<_, _, ()>(&key, json, ttl_millis)
            .await
            .map_err(|e| map_redis_error("failed to write value to Redis", e))?;
        debug!(slug = %slug, "Cached record in Redis");
        Ok(())
    }

    async fn exists(&self, slug: &Slug) -> Result<bool> {
        let key = self.cache_key(slug);
        let mut conn = self.connection()?;
        conn.exists::<_, bool>(&key)
            .await
            .map_err(|e| map_redis_error("failed to check key in Redis", e))
    }

    async fn del(&self, slug: &Slug) -> Result<()> {
        let key = self.cache_key(slug);
        trace!(slug = %slug, "Removing URL record from Redis cache");

        let mut conn = self.connection()?;
        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| map_redis_error("failed to delete value from Redis", e))
    }

    /// Deletes every key under this cache's prefix.
    ///
    /// Uses `KEYS`, which walks the whole keyspace; meant for maintenance and
    /// tests, not the request path.
    async fn flush(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let pattern = format!("{}*", self.key_prefix);
        let keys: Vec<String> = conn
            .keys(&pattern)
            .await
            .map_err(|e| map_redis_error("failed to list keys in Redis", e))?;

        if !keys.is_empty() {
            conn.del::<_, ()>(&keys)
                .await
                .map_err(|e| map_redis_error("failed to delete keys from Redis", e))?;
        }
        debug!(removed = keys.len(), "Flushed Redis cache");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.conn.write().take().is_some() {
            info!("Closed Redis cache connection");
        }
        Ok(())
    }
}

