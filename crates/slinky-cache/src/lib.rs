//! Cache implementations for Slinky.
//!
//! Backends implement [`UrlCache`] and report their own failures.
//! [`FailOpenCache`] wraps any of them and turns every failure into a
//! logged miss, which is what the persistence layer talks to.

pub mod fail_open;
pub mod moka;
pub mod redis;

pub use self::moka::MokaUrlCache;
pub use self::redis::RedisUrlCache;
pub use fail_open::FailOpenCache;
pub use slinky_core::{CacheError, UrlCache};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;
