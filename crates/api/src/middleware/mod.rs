//! HTTP middleware stack and extractors for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request, recorded on the span)

pub mod extract;
pub mod request_id;

pub use extract::{ApiJson, ApiPath};
pub use request_id::request_id_middleware;
