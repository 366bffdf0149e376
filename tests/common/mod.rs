//! Shared utilities for the integration tests.

#![allow(dead_code)]

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use todo_service::config::ServiceConfig;
use todo_service::http::middleware::AccessLog;
use todo_service::http::HttpServer;
use todo_service::storage::{SqliteStore, TodoRepository};

/// A unique path under the system temp directory.
pub fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}.{}", prefix, uuid::Uuid::new_v4(), ext))
}

/// Router over an in-memory store, plus the access log it writes.
pub struct TestApp {
    pub router: Router,
    pub access_log: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let store: Arc<dyn TodoRepository> = Arc::new(SqliteStore::open_in_memory().unwrap());
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServiceConfig, store: Arc<dyn TodoRepository>) -> Self {
        let access_log = temp_path("access", "log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&access_log)
            .unwrap();
        let server = HttpServer::new(config, store, AccessLog::new(Arc::new(file)));

        Self {
            router: server.router(),
            access_log,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<&str>) -> TestResponse {
        let body = match body {
            Some(b) => Body::from(b.to_string()),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Create a todo and return its JSON.
    pub async fn create(&self, payload: &str) -> serde_json::Value {
        let res = self.send("POST", "/todos", Some(payload)).await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {:?}", res.body);
        res.json()
    }

    pub async fn list(&self) -> Vec<serde_json::Value> {
        let res = self.send("GET", "/todos", None).await;
        assert_eq!(res.status, StatusCode::OK);
        serde_json::from_slice(&res.body).unwrap()
    }

    pub fn access_log_contents(&self) -> Vec<u8> {
        std::fs::read(&self.access_log).unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.access_log);
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}
