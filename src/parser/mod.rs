//! HTTP request-line parser.
//!
//! The server answers every connection from its first line alone, so this
//! module only tokenizes `<METHOD> <path> <version>` and percent-decodes the
//! path.

mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

pub use request::{decode_path, parse_request_line};
