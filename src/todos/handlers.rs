//! Todo endpoint handlers.
//!
//! Each handler makes one or two gateway calls and maps the outcome to a
//! status code. Gateway calls are synchronous SQLite work, so they run on
//! the blocking pool rather than the async workers. Bodies are taken as raw
//! bytes and decoded here, so the `Content-Type` header is not consulted and
//! every decode failure becomes a JSON 400.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::storage::{StoreResult, TodoRepository};
use crate::todos::{Todo, TodoInput};

fn decode(body: Result<Bytes, BytesRejection>) -> Result<TodoInput, ApiError> {
    let body = body?;
    TodoInput::from_json(&body).map_err(ApiError::Validation)
}

/// Run one gateway call on the blocking pool.
async fn with_store<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn TodoRepository) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || call(store.as_ref())).await?;
    Ok(result?)
}

/// `GET /todos`
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = with_store(&state, |store| store.find_all()).await?;
    Ok(Json(todos))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = decode(body)?;
    let todo = with_store(&state, move |store| store.create(input)).await?;

    tracing::debug!(id = todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `GET /todos/{id}`
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let todo = with_store(&state, move |store| store.find_by_id(&id)).await?;
    Ok(Json(todo))
}

/// `PUT /todos/{id}`
///
/// The record must exist before the body is considered, so a missing id is
/// a 404 even when the payload is also malformed.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Todo>, ApiError> {
    let existing = with_store(&state, move |store| store.find_by_id(&id)).await?;
    let input = decode(body)?;
    let todo = with_store(&state, move |store| store.update(existing.id, input)).await?;

    tracing::debug!(id = todo.id, "Todo updated");
    Ok(Json(todo))
}

/// `DELETE /todos/{id}`
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existing = with_store(&state, move |store| store.find_by_id(&id)).await?;
    let id = existing.id;
    with_store(&state, move |store| store.delete(id)).await?;

    tracing::debug!(id, "Todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /todos/error`: always fails.
pub async fn trigger_fault() -> Result<StatusCode, ApiError> {
    tracing::warn!("Fault endpoint called");
    Err(ApiError::InjectedFault)
}
