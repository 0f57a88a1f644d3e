use async_trait::async_trait;
use jiff::Timestamp;
use slinky_core::error::StorageError;
use slinky_core::repository::{Repository, Result, SaveOutcome, UrlRecord};
use slinky_core::slug::Slug;
use sqlx::{MySqlPool, Row};
use tracing::{debug, info};

const SCHEMA: &str = include_str!("../ddl/mysql/url_records.sql");

/// MySQL implementation of the repository contract.
///
/// Expiry is stored as unix milliseconds. Reads only return rows with
/// `expires_at > now`; expired rows linger until the reaper or the lazy
/// delete in [`save`](Repository::save) removes them.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_records` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("MySQL schema ready");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn now_unix_millis() -> i64 {
    Timestamp::now().as_millisecond()
}

fn parse_expires_at(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid expires_at timestamp '{millis}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    /// Clears an expired row for the slug, then inserts.
    ///
    /// The delete runs as its own autocommit statement. Inside a shared
    /// transaction it would take a gap lock on a missing slug, and two
    /// concurrent inserts of that slug would deadlock instead of one of them
    /// hitting the primary-key violation that signals a conflict.
    async fn save(&self, record: &UrlRecord) -> Result<SaveOutcome> {
        let cleared = sqlx::query(
            r#"
            DELETE FROM url_records
            WHERE slug = ?
              AND expires_at <= ?
            "#,
        )
        .bind(record.slug.as_str())
        .bind(now_unix_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if cleared.rows_affected() > 0 {
            debug!(slug = %record.slug, "Removed expired row before insert");
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO url_records (slug, target_url, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(record.slug.as_str())
        .bind(&record.target_url)
        .bind(record.expires_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(SaveOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(SaveOutcome::Conflict),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get(&self, slug: &Slug) -> Result<Option<UrlRecord>> {
        let row = sqlx::query(
            r#"
            SELECT target_url, expires_at
            FROM url_records
            WHERE slug = ?
              AND expires_at > ?
            LIMIT 1
            "#,
        )
        .bind(slug.as_str())
        .bind(now_unix_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let target_url: String = row.try_get("target_url").map_err(map_sqlx_error)?;
        let expires_at_raw: i64 = row.try_get("expires_at").map_err(map_sqlx_error)?;

        Ok(Some(UrlRecord {
            slug: slug.clone(),
            target_url,
            expires_at: parse_expires_at(expires_at_raw)?,
        }))
    }

    async fn exists(&self, slug: &Slug) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM url_records
            WHERE slug = ?
              AND expires_at > ?
            LIMIT 1
            "#,
        )
        .bind(slug.as_str())
        .bind(now_unix_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM url_records
            WHERE expires_at <= ?
            "#,
        )
        .bind(now_unix_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn close(&self) -> Result<()> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("Closed MySQL pool");
        }
        Ok(())
    }
}
