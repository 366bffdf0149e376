//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → per-request spans (http::request)
//!
//! Consumers (logging.rs):
//!     → stdout
//!     → access.log (HTTP trace events + raw request bodies)
//!     → error.log (warnings and errors)
//! ```

pub mod logging;

pub use logging::{init_logging, LogFiles};
