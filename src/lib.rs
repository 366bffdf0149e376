//! Todo Service Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod storage;
pub mod todos;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{Service, Shutdown};
pub use storage::{SqliteStore, TodoRepository};
pub use todos::{Todo, TodoInput};
