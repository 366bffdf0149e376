//! Todo resource: records, payloads and the REST endpoints over them.

pub mod handlers;
pub mod types;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::*;

pub use types::{Todo, TodoId, TodoInput};

/// Routes for the todo resource.
///
/// `/todos/error` is a static segment and wins over `/todos/{id}` for GET.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/error", get(trigger_fault))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}
