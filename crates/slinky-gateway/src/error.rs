use crate::model::UrlResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use slinky_core::ShortenerError;
use tracing::{debug, error};

pub type Result<T> = std::result::Result<T, AppError>;

const INVALID_REQUEST: &str = "Error: Invalid Request";
const SLUG_UNAVAILABLE: &str = "Error: Please choose another short slug or leave it empty!";
const NOT_FOUND: &str = "Error: URL Not Found";
const INTERNAL: &str = "Error: Internal Server Error";

#[derive(Debug)]
pub enum AppError {
    /// The body could not be decoded as a create request.
    Payload(JsonRejection),
    Shortener(ShortenerError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Payload(rejection)
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        Self::Shortener(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Payload(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected request body");
                (StatusCode::BAD_REQUEST, INVALID_REQUEST)
            }
            AppError::Shortener(ShortenerError::InvalidInput(reason)) => {
                debug!(%reason, "Rejected create request");
                (StatusCode::BAD_REQUEST, INVALID_REQUEST)
            }
            AppError::Shortener(ShortenerError::Conflict) => (StatusCode::CONFLICT, SLUG_UNAVAILABLE),
            AppError::Shortener(ShortenerError::NotFound) => (StatusCode::NOT_FOUND, NOT_FOUND),
            AppError::Shortener(ShortenerError::Storage(e)) => {
                error!(error = %e, "Storage failure while serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
            }
        };

        (status, Json(UrlResponse::error(message))).into_response()
    }
}
