//! Integration tests for the bikeshop API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bikeshop-integration-tests
//! ```
//!
//! Each [`TestApp`] owns a private in-memory `SQLite` database and a
//! temporary static directory, and drives the full router (middleware
//! included) in-process with `tower::ServiceExt::oneshot`. No server or
//! external database is needed.
//!
//! # Test Categories
//!
//! - `products` - Catalog endpoints and image uploads
//! - `cart` - Cart endpoints
//! - `health` - Health checks, static files, request IDs

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use bikeshop_server::config::ServerConfig;
use bikeshop_server::db;
use bikeshop_server::routes;
use bikeshop_server::state::AppState;

/// Body of the front page written into every test static directory.
pub const INDEX_HTML: &str = "<!doctype html><title>Bikeshop</title>";

const MAX_TEST_BODY: usize = 16 * 1024 * 1024;

/// An in-process application with its own database and static directory.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
    static_dir: TempDir,
}

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `detail` field of an error body.
    pub fn detail(&self) -> String {
        self.json()["detail"]
            .as_str()
            .expect("error body has no detail")
            .to_owned()
    }
}

impl TestApp {
    /// Start an app with default settings.
    pub async fn spawn() -> Self {
        Self::spawn_with(&[]).await
    }

    /// Start an app with extra configuration variables.
    ///
    /// `BIKESHOP_STATIC_DIR` always points at the app's temporary directory.
    pub async fn spawn_with(vars: &[(&str, &str)]) -> Self {
        let static_dir = tempfile::tempdir().expect("failed to create static dir");
        std::fs::write(static_dir.path().join("index.html"), INDEX_HTML)
            .expect("failed to write index.html");

        let static_path = static_dir.path().to_string_lossy().into_owned();
        let config = ServerConfig::from_lookup(|key| {
            if key == "BIKESHOP_STATIC_DIR" {
                return Some(static_path.clone());
            }
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        })
        .expect("invalid test configuration");

        let pool = db::create_memory_pool()
            .await
            .expect("failed to open in-memory database");
        db::migrate(&pool).await.expect("failed to run migrations");

        let state = AppState::new(config, pool.clone());
        state
            .images()
            .ensure_dir()
            .await
            .expect("failed to create image dir");

        Self {
            router: routes::app(state),
            pool,
            static_dir,
        }
    }

    /// The database backing this app.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Directory uploaded images are written to.
    pub fn image_dir(&self) -> PathBuf {
        self.static_dir.path().join("images")
    }

    /// Root of the static directory.
    pub fn static_dir(&self) -> &Path {
        self.static_dir.path()
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), MAX_TEST_BODY)
            .await
            .expect("failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a body-less request.
    pub async fn send(&self, method: Method, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("invalid request");
        self.request(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri).await
    }

    pub async fn put(&self, uri: &str) -> TestResponse {
        self.send(Method::PUT, uri).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri).await
    }

    /// Send a `multipart/form-data` POST.
    pub async fn post_multipart(&self, uri: &str, form: MultipartForm) -> TestResponse {
        let (content_type, body) = form.finish();
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("invalid request");
        self.request(request).await
    }

    /// Create a product through the API and return its ID.
    pub async fn create_product(&self, title: &str, price: &str, image_name: &str) -> i64 {
        let form = MultipartForm::new()
            .text("title", title)
            .text("description", "")
            .text("price", price)
            .file("image", image_name, b"image-bytes");

        let response = self.post_multipart("/products", form).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()["id"]
            .as_i64()
            .expect("create response has no id")
    }
}

/// Builder for `multipart/form-data` request bodies.
#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "bikeshop-test-boundary-7MA4YWxkTrZu0gW".to_owned(),
            body: Vec::new(),
        }
    }

    /// Add a plain text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body, returning the `Content-Type` header value and the bytes.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// A complete product form (`Trek 520`, `899.99`, `bike.jpg`).
pub fn trek_form() -> MultipartForm {
    MultipartForm::new()
        .text("title", "Trek 520")
        .text("description", "Steel touring bike")
        .text("price", "899.99")
        .file("image", "bike.jpg", b"\xFF\xD8\xFFjpeg")
}
