//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the todo routes and JSON fallbacks
//! - Wire up middleware (request ID, tracing, JSON error bodies, timeout,
//!   panic recovery, body limit, access log)
//! - Bind server to listener and serve until shutdown

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::Response,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::error::error_response;
use crate::http::middleware::{access_log_middleware, json_error_body, panic_response, AccessLog};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::lifecycle::signals;
use crate::storage::TodoRepository;
use crate::todos;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoRepository>,
}

/// HTTP server for the todo service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given store and access log.
    pub fn new(config: ServiceConfig, store: Arc<dyn TodoRepository>, access_log: AccessLog) -> Self {
        let state = AppState { store };
        let router = Self::build_router(&config, state, access_log);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers listed last run first: the request ID exists before the trace
    /// span opens, the access log sees the body after the size limit, and
    /// errors from the limit and timeout layers leave as JSON.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState, access_log: AccessLog) -> Router {
        Router::new()
            .merge(todos::routes())
            .fallback(route_not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state)
            .layer(middleware::from_fn_with_state(access_log, access_log_middleware))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(json_error_body))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| request_span(request)))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// an OS signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

async fn route_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

async fn wait_for_shutdown(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = signals::shutdown_signal() => {}
        _ = shutdown.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}
