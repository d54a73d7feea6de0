//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (one `http_request` span per request)
//! 3. Request ID (tag span, Sentry scope and response)
//! 4. Body limit (`DefaultBodyLimit` for uploads)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
