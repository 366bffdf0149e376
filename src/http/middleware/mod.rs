//! Request middleware.

pub mod access_log;
pub mod error_body;
pub mod recovery;

pub use access_log::{access_log_middleware, AccessLog, TeeBody};
pub use error_body::json_error_body;
pub use recovery::panic_response;
