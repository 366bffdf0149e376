//! Storage gateway subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → TodoRepository (trait object in AppState)
//!     → sqlite.rs (one statement per call, no cache)
//!     → todo.db
//! ```
//!
//! # Design Decisions
//! - Handlers depend on the trait, so tests can inject an in-memory store
//! - Missing rows are a typed `NotFound`, never an empty record
//! - Ids arrive as opaque strings and are bound as query parameters

pub mod sqlite;

use thiserror::Error;

use crate::todos::{Todo, TodoId, TodoInput};

pub use sqlite::SqliteStore;

/// Errors returned by the storage gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed access to the todo table.
pub trait TodoRepository: Send + Sync {
    /// Create the todo table if it does not exist. Existing rows are kept.
    fn ensure_schema(&self) -> StoreResult<()>;

    /// Every todo in storage order.
    fn find_all(&self) -> StoreResult<Vec<Todo>>;

    /// Exact-match lookup. `id` is compared as given; a value that is not
    /// a stored id matches nothing.
    fn find_by_id(&self, id: &str) -> StoreResult<Todo>;

    /// Insert a new row and return it with its assigned id.
    fn create(&self, input: TodoInput) -> StoreResult<Todo>;

    /// Replace every mutable field of an existing row.
    fn update(&self, id: TodoId, input: TodoInput) -> StoreResult<Todo>;

    /// Remove a row.
    fn delete(&self, id: TodoId) -> StoreResult<()>;
}
