//! Request-line parsing and representation.

use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// A parsed request line.
///
/// Only the first line of a request is ever looked at; headers and bodies are
/// left unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// The HTTP method (GET, HEAD, ...)
    pub method: Method,
    /// The percent-decoded request path
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
}

impl HttpRequest {
    /// Create a new request from already-decoded components.
    pub fn new(method: Method, path: impl Into<String>, version: HttpVersion) -> Self {
        Self {
            method,
            path: path.into(),
            version,
        }
    }
}

/// Percent-decode a request target.
///
/// Sequences that do not form valid UTF-8 once decoded are replaced with
/// U+FFFD; such a path can never name an existing file, so it falls through to
/// `404 Not Found` instead of failing the request.
pub fn decode_path(raw: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

/// Parse a single HTTP request line such as `GET /index.html HTTP/1.1`.
///
/// Tokens are checked in the order the handler needs to answer them: the
/// version first, then the method. Trailing `\r\n` is ignored.
///
/// # Examples
///
/// ```
/// use filehttp::{parse_request_line, HttpVersion, Method};
///
/// let request = parse_request_line("GET /docs/read%20me.txt HTTP/1.1\r\n").unwrap();
///
/// assert_eq!(request.method, Method::GET);
/// assert_eq!(request.path, "/docs/read me.txt");
/// assert_eq!(request.version, HttpVersion::Http11);
/// ```
pub fn parse_request_line(line: &str) -> Result<HttpRequest, Error> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(Error::EmptyRequest);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(line.to_string()));
    }

    let version = HttpVersion::from_str(parts[2])?;
    let method = Method::from_str(parts[0])?;
    let path = decode_path(parts[1]);

    Ok(HttpRequest::new(method, path, version))
}
