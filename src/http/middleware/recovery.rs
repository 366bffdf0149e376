//! Per-request panic recovery.
//!
//! Used with `tower_http::catch_panic::CatchPanicLayer`: a panicking handler
//! fails only its own request with a JSON 500 and the server keeps serving.

use std::any::Any;

use axum::{http::StatusCode, response::Response};

use crate::http::error::{error_response, INTERNAL_ERROR_MESSAGE};

/// Turn a caught panic payload into the standard 500 response.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "non-string panic payload"
    };

    tracing::error!(panic = %detail, "Handler panicked; request aborted");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}
