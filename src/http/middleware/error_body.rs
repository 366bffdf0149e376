//! JSON bodies for errors raised outside the handlers.
//!
//! The body limit and timeout layers answer with plain text or an empty
//! body. Any 4xx/5xx that is not already JSON is rewritten into the usual
//! `{"error": ...}` shape, keeping the status and the original text when
//! there is one.

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::Response,
    BoxError,
};

use crate::http::error::error_response;

/// Longest plain-text body carried over as the error message.
const MAX_MESSAGE_BYTES: usize = 1024;

/// Response mapper for `axum::middleware::map_response`.
pub async fn json_error_body<B>(response: Response<B>) -> Response
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let status = response.status();
    let is_error = status.is_client_error() || status.is_server_error();
    if !is_error || is_json(response.headers()) {
        return response.map(Body::new);
    }

    let text = match to_bytes(Body::new(response.into_body()), MAX_MESSAGE_BYTES).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    };
    let message = if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_ascii_lowercase()
    } else {
        text
    };

    error_response(status, message)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    async fn rewrite(response: Response) -> (StatusCode, HeaderMap, Bytes) {
        let response = json_error_body(response).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body)
    }

    fn plain(status: StatusCode, body: &'static str) -> Response {
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_plain_text_limit_error_becomes_json() {
        let (status, headers, body) =
            rewrite(plain(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded")).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(is_json(&headers));
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"error": "length limit exceeded"})
        );
    }

    #[tokio::test]
    async fn test_empty_timeout_uses_reason_phrase() {
        let response = Response::builder()
            .status(StatusCode::REQUEST_TIMEOUT)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = rewrite(response).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"error": "request timeout"})
        );
    }

    #[tokio::test]
    async fn test_json_errors_and_successes_pass_through() {
        let (status, _, body) =
            rewrite(error_response(StatusCode::NOT_FOUND, "record not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(&body[..], br#"{"error":"record not found"}"#);

        let (status, _, body) = rewrite(plain(StatusCode::OK, "fine")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"fine");
    }
}
