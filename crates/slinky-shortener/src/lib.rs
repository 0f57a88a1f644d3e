//! URL shortener service implementation.
//!
//! [`ShortenerService`] ties a slug generator to a
//! [`PersistenceCoordinator`](slinky_storage::PersistenceCoordinator) and
//! implements the [`Shortener`](slinky_core::Shortener) boundary.

pub mod service;
pub mod settings;
mod url;

pub use service::ShortenerService;
pub use settings::{SettingsError, ShortenerSettings};
pub use slinky_core::{CreateParams, ExpirationPolicy, Shortener, ShortenerError};
