//! Structured logging.
//!
//! # Sinks
//! - stdout: everything allowed by `RUST_LOG`, or `logging.level` when unset
//! - access log: HTTP trace events and request spans; the access-log
//!   middleware appends raw request bodies to the same file
//! - error log: every WARN and ERROR event, including recovered panics
//!
//! Both files are opened once in append mode and shared through `Arc<File>`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;
use crate::http::request::ACCESS_TARGET;

/// Open handles to the two log files.
#[derive(Clone, Debug)]
pub struct LogFiles {
    pub access: Arc<File>,
    pub error: Arc<File>,
}

impl LogFiles {
    /// Open (creating if needed) both files in append mode.
    pub fn open(config: &LoggingConfig) -> io::Result<Self> {
        Ok(Self {
            access: Arc::new(open_append(Path::new(&config.access_log))?),
            error: Arc::new(open_append(Path::new(&config.error_log))?),
        })
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig, files: &LogFiles) -> Result<(), TryInitError> {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let access_filter = Targets::new()
        .with_target("tower_http::trace", Level::DEBUG)
        .with_target(ACCESS_TARGET, Level::DEBUG);

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(stdout_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(files.access.clone())
                .with_filter(access_filter),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(files.error.clone())
                .with_filter(LevelFilter::WARN),
        )
        .try_init()
}
