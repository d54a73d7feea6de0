//! HTTP route handlers for the bikeshop API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                       - Front page (static/index.html)
//! GET    /static/*               - Static files, including product images
//! GET    /health                 - Liveness check
//! GET    /health/ready           - Readiness check (database reachable)
//!
//! # Products
//! POST   /products               - Create product (multipart: title, description, price, image)
//! GET    /products               - List products
//! GET    /products/{id}          - Get product
//! DELETE /products/{id}          - Delete product
//!
//! # Cart
//! POST   /cart?product_id=       - Add product to cart
//! GET    /cart                   - List cart rows
//! PUT    /cart/{product_id}?quantity= - Set quantity for every row of a product
//! DELETE /cart/{product_id}      - Remove every row of a product
//! ```

pub mod cart;
pub mod products;

use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, put},
};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Success body: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Success body for creations: `{"message": "...", "id": ...}`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse<Id> {
    pub message: &'static str,
    pub id: Id,
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", get(products::show).delete(products::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::index).post(cart::add))
        .route("/{product_id}", put(cart::update).delete(cart::remove))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}

/// Build the complete application: API, health checks, static files and
/// the request tracing stack.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();
    let index_file = state.config().index_file();
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .route_service("/", ServeFile::new(index_file))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
