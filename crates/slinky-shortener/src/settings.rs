use jiff::{SignedDuration, Timestamp};
use thiserror::Error;
use typed_builder::TypedBuilder;

/// Tunables for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Length of generated slugs.
    #[builder(default = 7)]
    pub slug_length: usize,
    /// Lifetime of records created with the default expiration policy.
    #[builder(default = 30)]
    pub default_expire_days: u32,
}

/// Errors returned when settings cannot configure a service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error(transparent)]
    SlugLength(#[from] slinky_generator::Error),
    #[error("default expiry of {days} days does not fit in a timestamp")]
    ExpireDaysOutOfRange { days: u32 },
}

impl ShortenerSettings {
    pub fn default_lifetime(&self) -> SignedDuration {
        SignedDuration::from_hours(i64::from(self.default_expire_days) * 24)
    }

    /// Rejects a default lifetime that would push expiry past the largest
    /// representable timestamp.
    pub(crate) fn check_default_lifetime(&self) -> Result<(), SettingsError> {
        Timestamp::now()
            .checked_add(self.default_lifetime())
            .map(|_| ())
            .map_err(|_| SettingsError::ExpireDaysOutOfRange {
                days: self.default_expire_days,
            })
    }
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
