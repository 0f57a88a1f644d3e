//! Core types and traits for the Slinky URL shortener.
//!
//! This crate provides the record model, the storage and cache contracts,
//! and the shortener boundary shared by every other crate in the workspace.

pub mod cache;
pub mod error;
pub mod expiry;
pub mod repository;
pub mod shortener;
pub mod slug;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use repository::{Repository, SaveOutcome, UrlRecord};
pub use shortener::{CreateParams, ExpirationPolicy, Shortener};
pub use slug::Slug;
