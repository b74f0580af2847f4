//! Mapping of request paths onto the served root directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Why a request path could not be mapped to a location inside the root.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The path, lexically or through a symbolic link, leads outside the root.
    #[error("Path escapes the root directory: {0}")]
    Traversal(String),

    /// The filesystem refused to canonicalize the path.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ResolveError {
    /// Whether the error means the requested entry simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ResolveError::Io(e) => is_missing(e),
            ResolveError::Traversal(_) => false,
        }
    }
}

// `ErrorKind::InvalidFilename` is too new to name, so match the OS code.
#[cfg(any(target_os = "linux", target_os = "android"))]
const NAME_TOO_LONG: Option<i32> = Some(36);
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
const NAME_TOO_LONG: Option<i32> = Some(63);
#[cfg(windows)]
const NAME_TOO_LONG: Option<i32> = Some(206);
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    windows
)))]
const NAME_TOO_LONG: Option<i32> = None;

/// Whether `e` says that no entry can exist at the path.
///
/// Besides a plain missing entry this covers a file used as a directory and
/// names the filesystem cannot hold at all: an embedded NUL byte or an
/// over-long component.
pub(crate) fn is_missing(e: &io::Error) -> bool {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput => true,
        _ => e.raw_os_error().is_some() && e.raw_os_error() == NAME_TOO_LONG,
    }
}

/// Resolves decoded request paths against a canonical root directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for `root`, which must exist.
    ///
    /// The root is canonicalized once here so that later prefix checks compare
    /// like with like even when the configured root is itself a symlink.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `request_path` to a canonical location inside the root.
    ///
    /// `.` and `..` segments are folded first; a `..` that would climb above
    /// the root fails with [`ResolveError::Traversal`] before the filesystem is
    /// consulted. The remaining path is then canonicalized, which follows
    /// symbolic links, and must still lie under the root.
    pub async fn resolve(&self, request_path: &str) -> Result<PathBuf, ResolveError> {
        let joined = self.join_lexically(request_path)?;
        let canonical = tokio::fs::canonicalize(&joined).await?;

        if !canonical.starts_with(&self.root) {
            return Err(ResolveError::Traversal(request_path.to_string()));
        }
        Ok(canonical)
    }

    fn join_lexically(&self, request_path: &str) -> Result<PathBuf, ResolveError> {
        let mut segments: Vec<&std::ffi::OsStr> = Vec::new();

        for component in Path::new(request_path).components() {
            match component {
                Component::Normal(segment) => segments.push(segment),
                Component::ParentDir => {
                    if segments.pop().is_none() {
                        return Err(ResolveError::Traversal(request_path.to_string()));
                    }
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }

        let mut joined = self.root.clone();
        joined.extend(segments);
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::testutil::ScratchDir;

    fn fixture_resolver() -> PathResolver {
        PathResolver::new(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/www")).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_root() {
        let resolver = fixture_resolver();
        let resolved = resolver.resolve("/").await.unwrap();
        assert_eq!(resolved, resolver.root());
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let resolver = fixture_resolver();
        let resolved = resolver.resolve("/test.txt").await.unwrap();
        assert_eq!(resolved, resolver.root().join("test.txt"));
    }

    #[tokio::test]
    async fn test_dot_segments_inside_root() {
        let resolver = fixture_resolver();
        let resolved = resolver.resolve("/./nested/../test.txt").await;
        // "nested" does not exist, but lexical folding never asks the filesystem
        assert_eq!(resolved.unwrap(), resolver.root().join("test.txt"));
    }

    #[tokio::test]
    async fn test_parent_above_root_is_traversal() {
        let resolver = fixture_resolver();
        let result = resolver.resolve("/../../etc/passwd").await;
        assert!(matches!(result, Err(ResolveError::Traversal(ref p)) if p == "/../../etc/passwd"));

        let result = resolver.resolve("/../missing").await;
        assert!(matches!(result, Err(ResolveError::Traversal(_))));
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let resolver = fixture_resolver();
        let err = resolver.resolve("/missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_path_below_file_is_not_found() {
        let resolver = fixture_resolver();
        let err = resolver.resolve("/test.txt/child").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_impossible_names_are_not_found() {
        let resolver = fixture_resolver();

        let err = resolver.resolve("/a\0b").await.unwrap_err();
        assert!(err.is_not_found(), "{err}");

        let long_name = format!("/{}", "x".repeat(300));
        let err = resolver.resolve(&long_name).await.unwrap_err();
        assert!(err.is_not_found(), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_loop_is_io_failure() {
        let root = ScratchDir::new("loop");
        std::os::unix::fs::symlink("loop", root.path().join("loop")).unwrap();

        let resolver = PathResolver::new(root.path()).unwrap();
        let err = resolver.resolve("/loop").await.unwrap_err();
        assert!(matches!(err, ResolveError::Io(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_relative_request_path_stays_in_root() {
        let resolver = fixture_resolver();
        let resolved = resolver.resolve("test.txt").await.unwrap();
        assert_eq!(resolved, resolver.root().join("test.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_root_is_traversal() {
        let outside = ScratchDir::new("outside");
        outside.write("secret.txt", "top secret");

        let root = ScratchDir::new("root");
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.path().join("leak.txt")).unwrap();
        std::os::unix::fs::symlink(root.path().join("inner.txt"), root.path().join("alias.txt")).unwrap();
        root.write("inner.txt", "fine");

        let resolver = PathResolver::new(root.path()).unwrap();
        assert!(matches!(resolver.resolve("/leak.txt").await, Err(ResolveError::Traversal(_))));
        assert_eq!(resolver.resolve("/alias.txt").await.unwrap(), resolver.root().join("inner.txt"));
    }

    #[test]
    fn test_missing_root_is_rejected() {
        assert!(PathResolver::new("/definitely/not/a/real/root").is_err());
    }
}
