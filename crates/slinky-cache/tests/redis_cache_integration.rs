use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use redis::AsyncCommands;
use slinky_cache::{CacheError, RedisUrlCache, UrlCache};
use slinky_core::{Slug, UrlRecord};
use slinky_test_infra::RedisServer;

async fn start() -> (RedisServer, RedisUrlCache) {
    let server = RedisServer::new()
        .await
        .expect("Failed to start Redis server");
    let conn = server
        .connection()
        .await
        .expect("Failed to get Redis connection");
    (server, RedisUrlCache::new(conn))
}

fn record(slug: &str, lifetime: SignedDuration) -> UrlRecord {
    UrlRecord {
        slug: Slug::new_unchecked(slug),
        target_url: format!("https://example.com/{slug}"),
        expires_at: Timestamp::now() + lifetime,
    }
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn basic_get_set_exists() {
    let (_server, cache) = start().await;
    let r = record("test123", SignedDuration::from_hours(1));

    assert!(cache.get_url(&r.slug).await.unwrap().is_none());
    assert!(!cache.exists(&r.slug).await.unwrap());

    cache.set_url(&r).await.unwrap();

    assert_eq!(cache.get_url(&r.slug).await.unwrap(), Some(r.clone()));
    assert!(cache.exists(&r.slug).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn ttl_follows_record_expiry() {
    let (server, cache) = start().await;
    let r = record("ttl", SignedDuration::from_secs(30));

    cache.set_url(&r).await.unwrap();

    let mut conn = server.connection().await.unwrap();
    let pttl: i64 = conn.pttl("sl:url:ttl").await.unwrap();
    assert!(pttl > 25_000 && pttl <= 30_000, "unexpected PTTL {pttl}");
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn entry_disappears_after_expiry() {
    let (_server, cache) = start().await;
    let r = record("brief", SignedDuration::from_millis(300));

    cache.set_url(&r).await.unwrap();
    assert!(cache.exists(&r.slug).await.unwrap());

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(!cache.exists(&r.slug).await.unwrap());
    assert!(cache.get_url(&r.slug).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn expired_record_is_skipped() {
    let (_server, cache) = start().await;
    let r = record("stale", SignedDuration::from_secs(-10));

    cache.set_url(&r).await.unwrap();

    assert!(!cache.exists(&r.slug).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn corrupt_value_is_reported() {
    let (server, cache) = start().await;

    let mut conn = server.connection().await.unwrap();
    conn.set::<_, _, ()>("sl:url:junk", "not json").await.unwrap();

    let err = cache
        .get_url(&Slug::new_unchecked("junk"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::InvalidData(_)));
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn del_and_flush_respect_prefix() {
    let (server, cache) = start().await;
    let a = record("a", SignedDuration::from_hours(1));
    let b = record("b", SignedDuration::from_hours(1));
    cache.set_url(&a).await.unwrap();
    cache.set_url(&b).await.unwrap();

    let mut conn = server.connection().await.unwrap();
    conn.set::<_, _, ()>("other:key", "keep").await.unwrap();

    cache.del(&a.slug).await.unwrap();
    assert!(!cache.exists(&a.slug).await.unwrap());
    assert!(cache.exists(&b.slug).await.unwrap());

    cache.flush().await.unwrap();
    assert!(!cache.exists(&b.slug).await.unwrap());
    let kept: Option<String> = conn.get("other:key").await.unwrap();
    assert_eq!(kept.as_deref(), Some("keep"));
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn custom_prefix_isolates_caches() {
    let (server, default_cache) = start().await;
    let conn = server.connection().await.unwrap();
    let custom = RedisUrlCache::with_prefix(conn, "custom:");
    let r = record("shared", SignedDuration::from_hours(1));

    custom.set_url(&r).await.unwrap();

    assert!(custom.exists(&r.slug).await.unwrap());
    assert!(!default_cache.exists(&r.slug).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn operations_fail_after_close() {
    let (_server, cache) = start().await;
    let r = record("closed", SignedDuration::from_hours(1));

    cache.close().await.unwrap();
    cache.close().await.unwrap();

    assert!(matches!(
        cache.get_url(&r.slug).await.unwrap_err(),
        CacheError::Closed
    ));
    assert!(matches!(
        cache.set_url(&r).await.unwrap_err(),
        CacheError::Closed
    ));
}
