//! HTTP response types and serialization.

use std::fmt;

use chrono::{DateTime, Utc};

/// Content type used when nothing more specific is known.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Format of the `Date` header line.
const DATE_FORMAT: &str = "%a %b %d %H:%M:%S UTC %Y";

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    NotFound = 404,
    ImATeapot = 418,
    InternalServerError = 500,
    NotImplemented = 501,
    ServiceUnavailable = 503,
    HttpVersionNotSupported = 505,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::ImATeapot => "I'm a teapot",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }

    /// The numeric status code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Renders the status text used on the status line, e.g. `404 Not Found`.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    /// Bytes sent after the header block.
    Full(Vec<u8>),
    /// A HEAD response: the length of the body that was left out.
    Omitted(u64),
}

/// Represents an HTTP response.
///
/// A response is built through one of the constructors and is not mutated
/// afterwards, apart from builder-style adjustments that keep its body and
/// its `Content-length` in agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    body: Body,
    content_type: String,
}

impl HttpResponse {
    /// Create a response that carries only a status.
    ///
    /// Every status other than `200 OK` gets a textual status page as its body,
    /// `"<code> <reason>\r\n"`, so error responses are self-describing.
    pub fn new(status: StatusCode) -> Self {
        let body = match status {
            StatusCode::Ok => Vec::new(),
            _ => format!("{status}\r\n").into_bytes(),
        };

        Self {
            status,
            body: Body::Full(body),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Create a `200 OK` response with a body and content type.
    pub fn ok(body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            status: StatusCode::Ok,
            body: Body::Full(body.into()),
            content_type: content_type.into(),
        }
    }

    /// Create a `200 OK` response to a HEAD request for a resource of
    /// `content_length` bytes, without holding the resource itself.
    pub fn ok_without_body(content_length: u64, content_type: impl Into<String>) -> Self {
        Self {
            status: StatusCode::Ok,
            body: Body::Omitted(content_length),
            content_type: content_type.into(),
        }
    }

    /// Drop the body while still advertising its length, as a HEAD response does.
    pub fn without_body(self) -> Self {
        let content_length = self.content_length();
        Self {
            body: Body::Omitted(content_length),
            ..self
        }
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The content type sent in the `Content-type` header.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The value of the `Content-length` header.
    pub fn content_length(&self) -> u64 {
        match &self.body {
            Body::Full(bytes) => bytes.len() as u64,
            Body::Omitted(len) => *len,
        }
    }

    /// The bytes written after the header block.
    pub fn serialize_body(&self) -> &[u8] {
        match &self.body {
            Body::Full(bytes) => bytes,
            Body::Omitted(_) => &[],
        }
    }

    /// Serialize the header block, stamped with the current time.
    pub fn serialize_headers(&self) -> String {
        self.serialize_headers_at(Utc::now())
    }

    /// Serialize the header block with an explicit `Date`.
    ///
    /// Lines come in a fixed order, each terminated by CRLF, and the block ends
    /// with an empty line.
    pub fn serialize_headers_at(&self, date: DateTime<Utc>) -> String {
        format!(
            "HTTP/1.1 {status}\r\n\
             Date {date}\r\n\
             Content-length: {length}\r\n\
             Connection: close\r\n\
             Content-type: {content_type}\r\n\
             \r\n",
            status = self.status,
            date = date.format(DATE_FORMAT),
            length = self.content_length(),
            content_type = self.content_type,
        )
    }

    /// Convert the response to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.serialize_headers().into_bytes();
        bytes.extend_from_slice(self.serialize_body());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_status_text() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
        assert_eq!(StatusCode::ImATeapot.to_string(), "418 I'm a teapot");
        assert_eq!(StatusCode::InternalServerError.to_string(), "500 Internal Server Error");
        assert_eq!(StatusCode::NotImplemented.to_string(), "501 Not Implemented");
        assert_eq!(StatusCode::HttpVersionNotSupported.to_string(), "505 HTTP Version Not Supported");
    }

    #[test]
    fn test_new_ok_response_is_empty() {
        let response = HttpResponse::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.serialize_body().is_empty());
        assert_eq!(response.content_type(), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_error_status_carries_status_page() {
        let response = HttpResponse::new(StatusCode::ImATeapot);
        assert_eq!(response.serialize_body(), b"418 I'm a teapot\r\n");

        let headers = response.serialize_headers();
        assert!(headers.starts_with("HTTP/1.1 418 I'm a teapot\r\n"));
        assert!(headers.contains("Content-length: 18\r\n"));
    }

    #[test]
    fn test_not_found_body() {
        let response = HttpResponse::new(StatusCode::NotFound);
        assert_eq!(response.serialize_body(), b"404 Not Found\r\n");
        assert_eq!(response.content_length(), 15);
    }

    #[test]
    fn test_ok_with_body() {
        let response = HttpResponse::ok("Hello, world!", "text/plain");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.serialize_body(), b"Hello, world!");
        assert_eq!(response.content_length(), 13);
        assert_eq!(response.content_type(), "text/plain");
    }

    #[test]
    fn test_serialize_headers_exact() {
        let response = HttpResponse::ok("abc", "text/plain");
        assert_eq!(
            response.serialize_headers_at(fixed_date()),
            "HTTP/1.1 200 OK\r\n\
             Date Sat Mar 09 14:05:07 UTC 2024\r\n\
             Content-length: 3\r\n\
             Connection: close\r\n\
             Content-type: text/plain\r\n\
             \r\n"
        );
    }

    #[test]
    fn test_every_header_line_ends_in_crlf() {
        let headers = HttpResponse::new(StatusCode::Ok).serialize_headers();
        assert!(headers.ends_with("\r\n\r\n"));

        let lines: Vec<&str> = headers.split_inclusive("\r\n").collect();
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| line.ends_with("\r\n")));
        assert_eq!(*lines.last().unwrap(), "\r\n");
    }

    #[test]
    fn test_without_body_keeps_length() {
        let response = HttpResponse::ok("0123456789", "text/plain").without_body();
        assert_eq!(response.content_length(), 10);
        assert!(response.serialize_body().is_empty());
        assert!(response.serialize_headers().contains("Content-length: 10\r\n"));

        let response = HttpResponse::new(StatusCode::NotFound).without_body();
        assert_eq!(response.content_length(), 15);
        assert!(response.serialize_body().is_empty());
    }

    #[test]
    fn test_ok_without_body() {
        let response = HttpResponse::ok_without_body(4096, "image/png");
        assert_eq!(response.content_length(), 4096);
        assert!(response.serialize_body().is_empty());
        assert!(response.to_bytes().ends_with(b"Content-type: image/png\r\n\r\n"));
    }

    #[test]
    fn test_to_bytes() {
        let bytes = HttpResponse::ok("Hello, world!", "text/plain").to_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response_str.contains("Content-type: text/plain\r\n"));
        assert!(response_str.contains("Content-length: 13\r\n"));
        assert!(response_str.ends_with("\r\n\r\nHello, world!"));
    }
}
