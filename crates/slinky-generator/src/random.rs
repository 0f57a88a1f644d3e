use crate::error::Error;
use crate::Generator;
use rand::Rng;
use slinky_core::slug::MAX_LENGTH;
use slinky_core::Slug;

/// The 62 symbols generated slugs are drawn from.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws fixed-length slugs uniformly from [`ALPHABET`].
///
/// Each call pulls from the thread-local generator returned by
/// [`rand::rng`], which is seeded from the operating system and reseeded
/// periodically, so concurrent callers never share a predictable sequence.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing slugs of exactly `length` symbols.
    pub fn new(length: usize) -> Result<Self, Error> {
        if length == 0 || length > MAX_LENGTH {
            return Err(Error::InvalidLength {
                length,
                max_length: MAX_LENGTH,
            });
        }
        Ok(Self { length })
    }
}

impl Generator for RandomGenerator {
    type Output = Slug;

    fn generate(&self) -> Self::Output {
        let mut rng = rand::rng();
        let slug: String = (0..self.length)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        Slug::new_unchecked(slug)
    }
}
