//! Error types for the HTTP server.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during HTTP server operation.
///
/// None of these is allowed to take down the server once it is listening; a
/// connection that hits one is logged and closed.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The peer did not send a request line in time.
    #[error("Timed out after {0:?} waiting for a request line")]
    Timeout(Duration),

    /// The request line exceeded the read buffer.
    #[error("Request line longer than {0} bytes")]
    RequestLineTooLong(usize),

    /// The configured root directory cannot be served.
    #[error("Invalid root directory {path}: {reason}")]
    InvalidRoot {
        path: PathBuf,
        reason: String,
    },

    /// A configured limit is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
