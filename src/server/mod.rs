//! Static-file HTTP server.
//!
//! One task per accepted connection reads a single request line, maps its
//! path onto the configured root directory and answers with the file, a
//! directory index or a status page, then closes the connection.

mod response;
mod config;
mod error;
mod files;
mod handler;
mod http_server;
mod resolver;
#[cfg(test)]
mod testutil;

// Re-export public items
pub use response::{HttpResponse, StatusCode, DEFAULT_CONTENT_TYPE};
pub use config::{ServerConfig, DEFAULT_ROOT_DIR, MAX_CONNECTIONS, MAX_READ_BUFFER_SIZE};
pub use error::Error;
pub use files::{content_type_for, list_directory, render_directory_index};
pub use handler::RequestHandler;
pub use http_server::HttpServer;
pub use resolver::{PathResolver, ResolveError};
