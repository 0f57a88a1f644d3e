mod app;
mod cli;
mod error;
mod handlers;
mod model;
mod state;
mod telemetry;

use crate::app::App;
use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use crate::state::AppState;
use anyhow::Context;
use clap::Parser;
use slinky_cache::{MokaUrlCache, RedisUrlCache};
use slinky_core::{Repository, Shortener, UrlCache};
use slinky_shortener::{ShortenerService, ShortenerSettings};
use slinky_storage::{InMemoryRepository, MySqlRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    telemetry::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    match config.storage {
        StorageBackendArg::InMemory => with_cache(&config, InMemoryRepository::new()).await,
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to MySQL")?;
            repository.init_schema().await?;
            with_cache(&config, repository).await
        }
    }
}

async fn with_cache<R>(config: &CLI, repository: R) -> anyhow::Result<()>
where
    R: Repository + Clone,
{
    match config.cache {
        CacheBackendArg::Moka => run_server(config, repository, MokaUrlCache::new()).await,
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let cache = RedisUrlCache::connect(redis_url)
                .await
                .context("failed to connect to Redis")?;
            run_server(config, repository, cache).await
        }
    }
}

async fn run_server<R, C>(config: &CLI, repository: R, cache: C) -> anyhow::Result<()>
where
    R: Repository + Clone,
    C: UrlCache,
{
    let settings = ShortenerSettings::builder()
        .slug_length(config.slug_length)
        .default_expire_days(config.default_expire_days)
        .build();
    let service = ShortenerService::from_settings(repository, cache, settings)?;
    service
        .start_reaper(Duration::from_secs(config.reaper_interval_secs))
        .await;

    let shortener = Arc::new(service);
    let router = App::router(AppState::new(shortener.clone(), config.base_url.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    finish(served, &*shortener).await
}

/// Shuts the shortener down whatever the server's outcome, then reports the
/// server error ahead of any shutdown error.
async fn finish<S>(served: std::io::Result<()>, shortener: &S) -> anyhow::Result<()>
where
    S: Shortener + ?Sized,
{
    let stopped = shortener.shutdown().await;
    served.context("gateway server failed")?;
    stopped.context("failed to shut down shortener")?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
