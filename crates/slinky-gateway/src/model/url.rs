use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    #[serde(rename = "real-url")]
    pub real_url: String,
    #[serde(rename = "short-slug", default)]
    pub short_slug: Option<String>,
    /// Wall-clock `dd/mm/yyyy HH:MM` in the server's time zone.
    #[serde(default, with = "slinky_core::expiry::optional")]
    pub expires: Option<Timestamp>,
}

/// Body of every `/api/create` reply, and of lookup errors.
///
/// Exactly one of the two fields is non-empty.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlResponse {
    #[serde(rename = "short-url")]
    pub short_url: String,
    #[serde(rename = "error-message")]
    pub error_message: String,
}

impl UrlResponse {
    pub fn created(short_url: String) -> Self {
        Self {
            short_url,
            error_message: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            short_url: String::new(),
            error_message: message.into(),
        }
    }
}
