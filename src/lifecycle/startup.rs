//! Startup and teardown orchestration.
//!
//! # Order
//! - Open the database and ensure the schema
//! - Build the HTTP server over the store and the access log
//! - Bind the listener last, so traffic arrives only when ready
//!
//! Teardown closes the database after the server stops, however it stopped.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::http::middleware::AccessLog;
use crate::http::HttpServer;
use crate::observability::LogFiles;
use crate::storage::{SqliteStore, StoreError, TodoRepository};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open database: {0}")]
    Database(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// What became of the database connection at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseTeardown {
    /// The connection was closed and flushed.
    Closed,
    /// Closing failed; the error was logged.
    CloseFailed,
    /// Something still held the store, so it closes when that is dropped.
    StillShared,
}

/// A bootstrapped service, bound and ready to serve.
pub struct Service {
    server: HttpServer,
    listener: TcpListener,
    store: Arc<SqliteStore>,
}

impl Service {
    /// Open storage, build the router and bind the listen address.
    pub async fn bootstrap(config: ServiceConfig, log_files: &LogFiles) -> Result<Self, StartupError> {
        let store = Arc::new(SqliteStore::open(&config.database.path)?);

        let bind_address = config.listener.bind_address.clone();
        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                address: bind_address,
                source,
            })?;

        let repository: Arc<dyn TodoRepository> = store.clone();
        let server = HttpServer::new(config, repository, AccessLog::new(log_files.access.clone()));

        Ok(Self {
            server,
            listener,
            store,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until shutdown, then close the database.
    ///
    /// The database is closed even when the server fails; the server error
    /// is returned after the close.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> std::io::Result<DatabaseTeardown> {
        let Self {
            server,
            listener,
            store,
        } = self;

        let result = server.run(listener, shutdown).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "HTTP server failed");
        }

        let teardown = close_store(store);
        result.map(|()| teardown)
    }
}

fn close_store(store: Arc<SqliteStore>) -> DatabaseTeardown {
    match Arc::try_unwrap(store) {
        Ok(store) => match store.close() {
            Ok(()) => {
                tracing::info!("Database closed");
                DatabaseTeardown::Closed
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to close database");
                DatabaseTeardown::CloseFailed
            }
        },
        Err(_) => {
            tracing::warn!("Database still referenced at shutdown; it closes when the last request finishes");
            DatabaseTeardown::StillShared
        }
    }
}
