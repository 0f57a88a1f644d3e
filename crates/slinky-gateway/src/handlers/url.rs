use crate::error::Result;
use crate::model::{CreateUrlRequest, UrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use slinky_core::{CreateParams, ExpirationPolicy};
use tracing::debug;

/// `POST /api/create`
pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlResponse>)> {
    let Json(request) = payload?;

    let mut params = CreateParams::new(request.real_url);
    if let Some(slug) = request.short_slug {
        params = params.with_slug(slug);
    }
    if let Some(expires_at) = request.expires {
        params = params.with_expiration(ExpirationPolicy::AtTimestamp(expires_at));
    }

    let slug = state.shortener().create(params).await?;
    let short_url = slug.to_url(state.base_url());

    Ok((StatusCode::CREATED, Json(UrlResponse::created(short_url))))
}

/// `GET /{slug}`, answered with `301 Moved Permanently`.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let record = state.shortener().resolve(&slug).await?;
    debug!(slug = %record.slug, target = %record.target_url, "Redirecting");
    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, record.target_url)],
    )
        .into_response())
}
