//! SQLite-backed todo store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::storage::{StoreError, StoreResult, TodoRepository};
use crate::todos::{Todo, TodoId, TodoInput};

/// A todo store over a single SQLite connection.
///
/// The connection is shared by all requests; each call holds the lock for
/// one short statement sequence and SQLite provides the consistency.
/// Every method blocks on file I/O, so async callers go through
/// `tokio::task::spawn_blocking` (see the todo handlers).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Database opened");
        Self::from_connection(conn)
    }

    /// A private in-memory database, mainly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> StoreResult<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| StoreError::Database(e))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering database connection after a panicked request");
            poisoned.into_inner()
        })
    }
}

impl TodoRepository for SqliteStore {
    fn ensure_schema(&self) -> StoreResult<()> {
        self.conn().execute(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                body TEXT,
                status BOOLEAN NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn find_all(&self) -> StoreResult<Vec<Todo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, title, body, status FROM todos ORDER BY id")?;
        let todos = stmt
            .query_map([], row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Todo> {
        self.conn()
            .query_row(
                "SELECT id, title, body, status FROM todos WHERE id = ?1",
                params![id],
                row_to_todo,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    fn create(&self, input: TodoInput) -> StoreResult<Todo> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO todos (title, body, status) VALUES (?1, ?2, ?3)",
            params![input.title, input.body, input.status],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Todo::from_input(id, input))
    }

    fn update(&self, id: TodoId, input: TodoInput) -> StoreResult<Todo> {
        let changed = self.conn().execute(
            "UPDATE todos SET title = ?2, body = ?3, status = ?4 WHERE id = ?1",
            params![id, input.title, input.body, input.status],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(Todo::from_input(id, input))
    }

    fn delete(&self, id: TodoId) -> StoreResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        status: row.get(3)?,
    })
}
