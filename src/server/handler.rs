//! Request handling: from a request line to a response.

use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use crate::parser::{parse_request_line, Error as ParserError, HttpRequest, Method};
use crate::server::error::Error;
use crate::server::files::{self, EntryKind};
use crate::server::resolver::{self, PathResolver, ResolveError};
use crate::server::response::{HttpResponse, StatusCode, DEFAULT_CONTENT_TYPE};

/// Turns request lines into responses for one served root directory.
///
/// The handler holds no mutable state and is shared by every connection.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    resolver: PathResolver,
}

impl RequestHandler {
    /// Create a handler serving `root_dir`.
    pub fn new(root_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let root_dir = root_dir.as_ref();
        let invalid = |reason: String| Error::InvalidRoot {
            path: root_dir.to_path_buf(),
            reason,
        };

        let resolver = PathResolver::new(root_dir).map_err(|e| invalid(e.to_string()))?;
        if !resolver.root().is_dir() {
            return Err(invalid("not a directory".to_string()));
        }
        Ok(Self { resolver })
    }

    /// The canonical root directory being served.
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Answer a raw request line.
    ///
    /// A line that does not parse is still answered: an unknown method with
    /// `501 Not Implemented`, anything else malformed with
    /// `505 HTTP Version Not Supported`.
    pub async fn respond(&self, line: &str) -> HttpResponse {
        match parse_request_line(line) {
            Ok(request) => self.handle(&request).await,
            Err(ParserError::InvalidMethod(method)) => {
                debug!("Unsupported method {method}");
                HttpResponse::new(StatusCode::NotImplemented)
            }
            Err(e) => {
                debug!("Rejecting request line: {e}");
                HttpResponse::new(StatusCode::HttpVersionNotSupported)
            }
        }
    }

    /// Answer a parsed request.
    pub async fn handle(&self, request: &HttpRequest) -> HttpResponse {
        if !request.version.is_supported() {
            return HttpResponse::new(StatusCode::HttpVersionNotSupported);
        }

        match request.method {
            Method::GET => self.build_file_response(&request.path).await,
            Method::HEAD => self.build_response(&request.path, false).await.without_body(),
            _ => HttpResponse::new(StatusCode::NotImplemented),
        }
    }

    /// Build the GET response for a decoded request path.
    ///
    /// Regular files are returned whole with a MIME type guessed from their
    /// name, directories as an HTML index. Missing entries give
    /// `404 Not Found`, every other filesystem failure
    /// `500 Internal Server Error`.
    pub async fn build_file_response(&self, request_path: &str) -> HttpResponse {
        self.build_response(request_path, true).await
    }

    async fn build_response(&self, request_path: &str, include_body: bool) -> HttpResponse {
        let (request_path, target) = match self.sanitize(request_path).await {
            Ok(resolved) => resolved,
            Err(response) => return response,
        };

        let kind = match files::entry_kind(&target).await {
            Ok(kind) => kind,
            Err(e) => return filesystem_failure(&target, e),
        };

        match kind {
            EntryKind::File(len) if !include_body => {
                HttpResponse::ok_without_body(len, files::content_type_for(&target))
            }
            EntryKind::File(_) => match files::read_file(&target).await {
                Ok(data) => HttpResponse::ok(data, files::content_type_for(&target)),
                Err(e) => filesystem_failure(&target, e),
            },
            EntryKind::Directory => match files::render_directory_index(&target, &request_path).await {
                Ok(page) => HttpResponse::ok(page, DEFAULT_CONTENT_TYPE),
                Err(e) => filesystem_failure(&target, e),
            },
            EntryKind::Other => {
                error!("Refusing to serve special file {}", target.display());
                HttpResponse::new(StatusCode::InternalServerError)
            }
        }
    }

    /// Resolve a request path, redirecting paths that escape the root to `/`.
    ///
    /// Returns the request path that was actually served together with its
    /// filesystem location, or the error response to send instead.
    async fn sanitize(&self, request_path: &str) -> Result<(String, PathBuf), HttpResponse> {
        match self.resolver.resolve(request_path).await {
            Ok(target) => Ok((request_path.to_string(), target)),
            Err(ResolveError::Traversal(path)) => {
                warn!("Path traversal attempt for {path}, serving / instead");
                self.resolver
                    .resolve("/")
                    .await
                    .map(|target| ("/".to_string(), target))
                    .map_err(|e| resolve_failure(request_path, e))
            }
            Err(e) => Err(resolve_failure(request_path, e)),
        }
    }
}

fn resolve_failure(request_path: &str, e: ResolveError) -> HttpResponse {
    if e.is_not_found() {
        HttpResponse::new(StatusCode::NotFound)
    } else {
        error!("Failed to resolve {request_path}: {e}");
        HttpResponse::new(StatusCode::InternalServerError)
    }
}

fn filesystem_failure(target: &Path, e: io::Error) -> HttpResponse {
    if resolver::is_missing(&e) {
        HttpResponse::new(StatusCode::NotFound)
    } else {
        error!("Failed to read {}: {e}", target.display());
        HttpResponse::new(StatusCode::InternalServerError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_are_not_found() {
        let target = Path::new("/srv/missing");
        for kind in [io::ErrorKind::NotFound, io::ErrorKind::NotADirectory, io::ErrorKind::InvalidInput] {
            let response = filesystem_failure(target, io::Error::from(kind));
            assert_eq!(response.status(), StatusCode::NotFound, "{kind:?}");
        }
    }

    #[test]
    fn test_io_failures_are_internal_errors() {
        let target = Path::new("/srv/private");
        for kind in [io::ErrorKind::PermissionDenied, io::ErrorKind::Other, io::ErrorKind::UnexpectedEof] {
            let response = filesystem_failure(target, io::Error::from(kind));
            assert_eq!(response.status(), StatusCode::InternalServerError, "{kind:?}");
            assert_eq!(response.serialize_body(), b"500 Internal Server Error\r\n");
        }

        let response = resolve_failure("/private", ResolveError::Io(io::ErrorKind::PermissionDenied.into()));
        assert_eq!(response.status(), StatusCode::InternalServerError);
    }
}
