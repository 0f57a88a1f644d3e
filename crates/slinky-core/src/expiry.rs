//! Text codec for expiry instants.
//!
//! Clients exchange expiry times as `dd/mm/yyyy HH:MM` wall-clock strings.
//! The domain only ever holds a [`Timestamp`]; conversion happens here, in an
//! explicit time zone.

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use thiserror::Error;

/// The wall-clock layout used on the wire, e.g. `24/12/2026 18:30`.
pub const FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, Error)]
#[error("invalid expiry '{input}', expected dd/mm/yyyy HH:MM: {reason}")]
pub struct ExpiryParseError {
    input: String,
    reason: String,
}

/// Parses a `dd/mm/yyyy HH:MM` string as wall-clock time in `tz`.
pub fn parse(input: &str, tz: &TimeZone) -> Result<Timestamp, ExpiryParseError> {
    let error = |reason: jiff::Error| ExpiryParseError {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let datetime = DateTime::strptime(FORMAT, input.trim()).map_err(error)?;
    let zoned = datetime.to_zoned(tz.clone()).map_err(error)?;
    Ok(zoned.timestamp())
}

/// Formats an instant as `dd/mm/yyyy HH:MM` wall-clock time in `tz`.
pub fn format(timestamp: Timestamp, tz: &TimeZone) -> String {
    timestamp.to_zoned(tz.clone()).strftime(FORMAT).to_string()
}

/// Serde adapter for `Option<Timestamp>` fields in the wire format, using the
/// system time zone. Missing, `null` and empty strings all decode to `None`.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Request {
///     #[serde(default, with = "slinky_core::expiry::optional")]
///     expires: Option<Timestamp>,
/// }
/// ```
pub mod optional {
    use super::{format, parse};
    use jiff::tz::TimeZone;
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => serializer.serialize_str(&format(*timestamp, &TimeZone::system())),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text, &TimeZone::system())
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
