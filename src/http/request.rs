//! Request identification and tracing spans.
//!
//! # Responsibilities
//! - Assign a UUID v4 request ID unless the client sent one
//! - Echo the ID back on the response
//! - Open one span per request carrying the ID, method and URI
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Spans use the `todo_service::access` target so the access-log file
//!   layer can keep them alongside `tower_http::trace` events

use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Tracing target for per-request spans.
pub const ACCESS_TARGET: &str = "todo_service::access";

/// Layer that assigns a request ID to requests without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Span for one request, used as the `TraceLayer` span maker.
pub fn request_span<B>(request: &Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::debug_span!(
        target: ACCESS_TARGET,
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}
