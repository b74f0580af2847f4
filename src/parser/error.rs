//! Error types for the request-line parser.

use thiserror::Error;

/// Errors that can occur while parsing an HTTP request line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The HTTP method in the request is not one this server knows.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request line does not consist of method, path and version.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP version token is not a recognized protocol version.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// The request line is empty.
    #[error("Empty request")]
    EmptyRequest,
}
