pub mod error;
pub mod random;

pub use error::Error;
pub use random::{RandomGenerator, ALPHABET};

use slinky_core::Slug;

/// Trait for generating candidate slugs.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated slug is only a candidate: the caller is responsible for
/// checking that it is unused before storing anything under it.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<Slug>;

    /// Produces the next candidate.
    fn generate(&self) -> Self::Output;
}
