use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SLINKY_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SLINKY_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "SLINKY_STORAGE";
pub const MYSQL_DSN_ENV: &str = "SLINKY_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "SLINKY_CACHE";
pub const REDIS_URL_ENV: &str = "SLINKY_REDIS_URL";
pub const SLUG_LENGTH_ENV: &str = "SLINKY_SLUG_LENGTH";
pub const DEFAULT_EXPIRE_DAYS_ENV: &str = "SLINKY_DEFAULT_EXPIRE_DAYS";
pub const REAPER_INTERVAL_ENV: &str = "SLINKY_REAPER_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "SLINKY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "slinky-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix of every short URL handed out, e.g. `https://sl.ink`.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = SLUG_LENGTH_ENV, default_value_t = 7)]
    pub slug_length: usize,

    #[arg(long, env = DEFAULT_EXPIRE_DAYS_ENV, default_value_t = 30)]
    pub default_expire_days: u32,

    #[arg(long, env = REAPER_INTERVAL_ENV, default_value_t = 86_400)]
    pub reaper_interval_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_in_process_backends() {
        let cli = CLI::try_parse_from(["gateway"]).unwrap();

        assert_eq!(cli.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.storage, StorageBackendArg::InMemory);
        assert_eq!(cli.cache, CacheBackendArg::Moka);
        assert_eq!(cli.slug_length, 7);
        assert_eq!(cli.default_expire_days, 30);
        assert_eq!(cli.reaper_interval_secs, 86_400);
        assert_eq!(cli.log_format, LogFormatArg::Text);
    }

    #[test]
    fn mysql_requires_a_dsn() {
        assert!(CLI::try_parse_from(["gateway", "--storage", "mysql"]).is_err());

        let cli = CLI::try_parse_from([
            "gateway",
            "--storage",
            "mysql",
            "--mysql-dsn",
            "mysql://u:p@localhost/slinky",
        ])
        .unwrap();
        assert_eq!(cli.storage, StorageBackendArg::Mysql);
    }

    #[test]
    fn redis_requires_a_url() {
        assert!(CLI::try_parse_from(["gateway", "--cache", "redis"]).is_err());
    }
}
