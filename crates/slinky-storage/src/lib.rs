//! Durable storage for Slinky.
//!
//! Repository adapters, the background [`Reaper`] that sweeps expired
//! rows, and the [`PersistenceCoordinator`] that pairs a repository with a
//! cache.

pub mod coordinator;
pub mod memory;
pub mod mysql;
pub mod reaper;

pub use coordinator::PersistenceCoordinator;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use reaper::{Reaper, ReaperHandle};
pub use slinky_core::{Repository, SaveOutcome, StorageError};
