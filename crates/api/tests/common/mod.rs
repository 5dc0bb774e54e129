#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use sheltered_api::config::ServerConfig;
use sheltered_api::router::build_app_router;
use sheltered_api::state::AppState;
use sheltered_core::image_store::LocalFileSystemImageStore;

/// Boundary used for hand-built multipart bodies.
const BOUNDARY: &str = "sheltered-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(image_directory: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        image_directory: image_directory.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
    }
}

/// Build the full application router on `pool`, with images written to a
/// fresh temporary directory.
///
/// Goes through [`build_app_router`] so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) as production.
/// Keep the returned [`TempDir`] alive for the duration of the test.
pub async fn build_test_app(pool: SqlitePool) -> (Router, TempDir) {
    let images = tempfile::tempdir().unwrap();
    let config = test_config(images.path());
    let image_store = LocalFileSystemImageStore::new(images.path()).await.unwrap();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        image_store: Arc::new(image_store),
    };

    (build_app_router(state, &config), images)
}

/// Number of files currently in the image directory.
pub fn image_count(images: &TempDir) -> usize {
    std::fs::read_dir(images.path()).unwrap().count()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, empty(Method::GET, uri)).await
}

pub async fn head(app: Router, uri: &str) -> Response {
    send(app, empty(Method::HEAD, uri)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, empty(Method::DELETE, uri)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json(Method::POST, uri, body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json(Method::PUT, uri, body)).await
}

/// PUT a single-field multipart form.
pub async fn put_multipart(
    app: Router,
    uri: &str,
    field: &str,
    content_type: &str,
    data: &[u8],
) -> Response {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
