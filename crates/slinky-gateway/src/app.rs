use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{create_url_handler, health_handler, redirect_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/api/create", post(create_url_handler))
            .route("/{slug}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UrlResponse;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use slinky_cache::MokaUrlCache;
    use slinky_core::{CreateParams, Shortener, ShortenerError, Slug, StorageError, UrlRecord};
    use slinky_shortener::{ShortenerService, ShortenerSettings};
    use slinky_storage::InMemoryRepository;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BASE_URL: &str = "http://sl.test";

    fn app() -> Router {
        let service = ShortenerService::from_settings(
            InMemoryRepository::new(),
            MokaUrlCache::new(),
            ShortenerSettings::default(),
        )
        .unwrap();
        App::router(AppState::new(Arc::new(service), BASE_URL))
    }

    async fn create(app: &Router, body: &str) -> Response {
        app.clone()
            .oneshot(
                Request::post("/api/create")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_of(response: Response) -> UrlResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = get(&app(), "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn create_with_slug_then_redirect() {
        let app = app();

        let response = create(
            &app,
            r#"{"real-url": "https://example.com/page", "short-slug": "abc"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_of(response).await,
            UrlResponse::created(format!("{BASE_URL}/abc"))
        );

        let response = get(&app, "/abc").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/page"
        );
    }

    #[tokio::test]
    async fn create_with_generated_slug() {
        let app = app();

        let response = create(&app, r#"{"real-url": "https://example.com"}"#).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_of(response).await;
        let slug = body
            .short_url
            .strip_prefix(&format!("{BASE_URL}/"))
            .unwrap()
            .to_string();
        assert_eq!(slug.len(), 7);

        let response = get(&app, &format!("/{slug}")).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn future_expiry_is_accepted() {
        let response = create(
            &app(),
            r#"{"real-url": "https://example.com", "short-slug": "later", "expires": "01/01/2099 00:00"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn past_expiry_is_created_but_not_resolvable() {
        let app = app();

        let response = create(
            &app,
            r#"{"real-url": "https://example.com", "short-slug": "past", "expires": "01/01/2000 00:00"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        assert_eq!(get(&app, "/past").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_slug_is_masked_conflict() {
        let app = app();
        let body = r#"{"real-url": "https://example.com", "short-slug": "dup"}"#;

        create(&app, body).await;
        let response = create(&app, body).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_of(response).await,
            UrlResponse::error("Error: Please choose another short slug or leave it empty!")
        );
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let response = get(&app(), "/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_of(response).await,
            UrlResponse::error("Error: URL Not Found")
        );
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let app = app();

        for body in [
            "not json",
            r#"{"short-slug": "x"}"#,
            r#"{"real-url": "https://example.com", "expires": "2099-01-01"}"#,
            r#"{"real-url": "ftp://example.com"}"#,
        ] {
            let response = create(&app, body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(
                body_of(response).await,
                UrlResponse::error("Error: Invalid Request")
            );
        }
    }

    /// Shortener whose stores are always down.
    struct Unavailable;

    #[async_trait]
    impl Shortener for Unavailable {
        async fn create(&self, _params: CreateParams) -> Result<Slug, ShortenerError> {
            Err(StorageError::Unavailable("connection refused".into()).into())
        }

        async fn resolve(&self, _slug: &str) -> Result<UrlRecord, ShortenerError> {
            Err(StorageError::Timeout("pool timed out".into()).into())
        }

        async fn shutdown(&self) -> Result<(), ShortenerError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn storage_failures_are_internal_errors() {
        let app = App::router(AppState::new(Arc::new(Unavailable), BASE_URL));

        let response = create(&app, r#"{"real-url": "https://example.com"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(response).await,
            UrlResponse::error("Error: Internal Server Error")
        );

        let response = get(&app, "/anything").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
