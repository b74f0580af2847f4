//! A minimal static-file HTTP server.
//!
//! Every accepted connection carries exactly one request: the server reads the
//! request line, resolves the path against a root directory, and answers with
//! the file contents, an HTML directory index, or a textual status page before
//! closing the connection.
//!
//! # Features
//!
//! - `GET` and `HEAD` for regular files and directories; every other method
//!   gets `501 Not Implemented`
//! - Only `HTTP/1.1` is spoken; other versions get `505 HTTP Version Not Supported`
//! - Percent-decoded paths, with traversal outside the root redirected to `/`
//! - MIME types guessed from file names
//! - Sorted, HTML-escaped directory listings
//! - One task per connection, an optional connection limit, an idle-read
//!   timeout and graceful shutdown on Ctrl+C
//!
//! # Examples
//!
//! ## Answering a request line
//!
//! ```no_run
//! use filehttp::{RequestHandler, StatusCode};
//!
//! # async fn demo() -> Result<(), filehttp::ServerError> {
//! let handler = RequestHandler::new("/var/www/html")?;
//! let response = handler.respond("GET /index.html HTTP/1.1\r\n").await;
//!
//! if response.status() == StatusCode::Ok {
//!     println!("{} bytes of {}", response.content_length(), response.content_type());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Status pages
//!
//! ```
//! use filehttp::{HttpResponse, StatusCode};
//!
//! let response = HttpResponse::new(StatusCode::NotFound);
//! assert_eq!(response.serialize_body(), b"404 Not Found\r\n");
//! assert!(response.serialize_headers().starts_with("HTTP/1.1 404 Not Found\r\n"));
//! ```
//!
//! ## Running a server
//!
//! ```no_run
//! use filehttp::{HttpServer, ServerConfig};
//!
//! # async fn demo() -> Result<(), filehttp::ServerError> {
//! let config = ServerConfig {
//!     root_dir: "/srv/public".into(),
//!     ..ServerConfig::default()
//! };
//! HttpServer::new(config)?.start().await
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Command-line front end for the binary
pub mod cli;

// Re-export commonly used items for convenience
pub use parser::{parse_request_line, Error as ParserError, HttpRequest, HttpVersion, Method};
pub use server::{
    Error as ServerError, HttpResponse, HttpServer, PathResolver, RequestHandler, ServerConfig, StatusCode,
};
