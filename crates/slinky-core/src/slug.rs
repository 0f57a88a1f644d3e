use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Upper bound on slug length, matching the durable primary-key column.
pub const MAX_LENGTH: usize = 50;

/// The short identifier a target URL is stored under.
///
/// Generated slugs are drawn from a fixed alphabet; caller-supplied slugs
/// may use any characters as long as they are non-empty and fit in
/// [`MAX_LENGTH`] bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Creates a new `Slug` after validating the input.
    pub fn new(slug: impl Into<String>) -> std::result::Result<Self, CoreError> {
        let slug = slug.into();
        Self::validate(&slug)?;
        Ok(Self(slug))
    }

    /// Creates a `Slug` without validation.
    ///
    /// Use this only for slugs produced by trusted internal sources
    /// (the generator, or rows read back from a store).
    pub fn new_unchecked(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(slug: &str) -> std::result::Result<(), CoreError> {
        if slug.is_empty() {
            return Err(CoreError::InvalidSlug("slug cannot be empty".to_string()));
        }

        if slug.len() > MAX_LENGTH {
            return Err(CoreError::InvalidSlug(format!(
                "length must be at most {} bytes, got {}",
                MAX_LENGTH,
                slug.len()
            )));
        }

        Ok(())
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        assert!(Slug::new("a").is_ok());
        assert!(Slug::new("kittens").is_ok());
        assert!(Slug::new("with spaces & symbols!").is_ok());
        assert!(Slug::new("a".repeat(MAX_LENGTH)).is_ok());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(Slug::new("").is_err());
    }

    #[test]
    fn too_long() {
        assert!(Slug::new("a".repeat(MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn display_matches_input() {
        let slug = Slug::new("my-slug").unwrap();
        assert_eq!(slug.to_string(), "my-slug");
    }

    #[test]
    fn to_url_joins_base() {
        let slug = Slug::new("abc123").unwrap();
        assert_eq!(slug.to_url("https://sl.inky"), "https://sl.inky/abc123");
        assert_eq!(slug.to_url("https://sl.inky/"), "https://sl.inky/abc123");
    }

    #[test]
    fn serializes_as_plain_string() {
        let slug = Slug::new_unchecked("abc");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"abc\"");
    }
}
