//! API error type and its JSON rendering.
//!
//! Every error leaves the service as `{"error": "<message>"}`. Internal
//! details are logged, never returned.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;

use crate::storage::StoreError;

/// Message returned for every 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be decoded.
    #[error("{0}")]
    Validation(String),

    #[error("record not found")]
    NotFound,

    /// The body could not be read (too large, aborted).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("storage failure: {0}")]
    Storage(StoreError),

    /// A storage call on the blocking pool panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(#[from] JoinError),

    /// Deliberate failure raised by the fault endpoint.
    #[error("injected fault")]
    InjectedFault,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Build a JSON error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Storage(_) | ApiError::Task(_) | ApiError::InjectedFault => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            return error_response(status, INTERNAL_ERROR_MESSAGE);
        }
        error_response(status, self.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            other => ApiError::Storage(other),
        }
    }
}
