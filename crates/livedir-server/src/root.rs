//! Served root directory and request path mapping.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::StartupError;

/// File served for `/` and for directory requests.
pub const INDEX_FILE: &str = "index.html";

/// What a request path resolves to under the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestTarget {
    /// An existing file inside the root.
    File(PathBuf),
    /// A directory with an index, requested without a trailing slash.
    Directory,
}

/// Canonical directory whose contents are exposed over HTTP.
///
/// Fixed for the lifetime of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServedRoot(PathBuf);

impl ServedRoot {
    /// Resolve the serve target given on the command line.
    ///
    /// A path to a regular file serves its parent directory, so pointing the
    /// server at `index.html` works.
    pub fn resolve(path: &Path) -> Result<Self, StartupError> {
        let canonical = path.canonicalize().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StartupError::PathNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StartupError::PathUnreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let dir = if canonical.is_file() {
            canonical
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::PathNotFound {
                    path: path.to_path_buf(),
                })?
        } else {
            canonical
        };

        std::fs::read_dir(&dir).map_err(|source| StartupError::PathUnreadable {
            path: dir.clone(),
            source,
        })?;

        Ok(Self(dir))
    }

    /// Absolute path of the root directory.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Map a URL path to a candidate file path under the root.
    ///
    /// `/` becomes `/index.html`. Segments are percent-decoded; any `..`
    /// segment or embedded separator makes the path unresolvable. The result
    /// is purely lexical and may not exist.
    pub fn candidate(&self, url_path: &str) -> Option<PathBuf> {
        let url_path = if url_path == "/" || url_path.is_empty() {
            "/index.html"
        } else {
            url_path
        };

        let mut resolved = self.0.clone();
        for raw in url_path.split('/') {
            let segment = percent_decode_str(raw).decode_utf8().ok()?;
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment.contains(['/', '\\']) {
                return None;
            }
            let mut components = Path::new(&*segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) => resolved.push(name),
                _ => return None,
            }
        }
        Some(resolved)
    }

    /// Resolve a URL path to an existing target contained in the root.
    ///
    /// A directory resolves to its `index.html` when the URL ends in `/`, and
    /// to [`RequestTarget::Directory`] otherwise. Returns `None` when nothing
    /// exists there or the canonical target lies outside the root (for
    /// example through a symlink).
    pub async fn resolve_request(&self, url_path: &str) -> Option<RequestTarget> {
        let candidate = self.candidate(url_path)?;
        let canonical = self.contained(&candidate).await?;

        if !tokio::fs::metadata(&canonical).await.ok()?.is_dir() {
            return Some(RequestTarget::File(canonical));
        }

        let index = self.contained(&canonical.join(INDEX_FILE)).await?;
        if url_path.ends_with('/') {
            Some(RequestTarget::File(index))
        } else {
            Some(RequestTarget::Directory)
        }
    }

    async fn contained(&self, path: &Path) -> Option<PathBuf> {
        let canonical = tokio::fs::canonicalize(path).await.ok()?;
        canonical.starts_with(&self.0).then_some(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn site() -> (tempfile::TempDir, ServedRoot) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<head></head>").unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/index.html"), "guide").unwrap();
        fs::write(dir.path().join("guide/page two.css"), "body{}").unwrap();
        let root = ServedRoot::resolve(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_resolve_directory() {
        let dir = tempfile::tempdir().unwrap();

        let root = ServedRoot::resolve(dir.path()).unwrap();

        assert_eq!(root.path(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_file_uses_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        fs::write(&file, "hi").unwrap();

        let root = ServedRoot::resolve(&file).unwrap();

        assert_eq!(root.path(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = ServedRoot::resolve(&missing).unwrap_err();

        assert!(matches!(err, StartupError::PathNotFound { path } if path == missing));
    }

    #[test]
    fn test_candidate_root_is_index() {
        let (_dir, root) = site();

        assert_eq!(root.candidate("/"), Some(root.path().join("index.html")));
        assert_eq!(root.candidate(""), Some(root.path().join("index.html")));
    }

    #[test]
    fn test_candidate_nested_and_decoded() {
        let (_dir, root) = site();

        assert_eq!(
            root.candidate("/guide/page%20two.css"),
            Some(root.path().join("guide").join("page two.css"))
        );
        assert_eq!(
            root.candidate("//guide/./index.html"),
            Some(root.path().join("guide").join("index.html"))
        );
    }

    #[test]
    fn test_candidate_rejects_traversal() {
        let (_dir, root) = site();

        assert_eq!(root.candidate("/../../etc/passwd"), None);
        assert_eq!(root.candidate("/guide/../../secret"), None);
        assert_eq!(root.candidate("/%2e%2e/secret"), None);
        assert_eq!(root.candidate("/guide%2f..%2f..%2fsecret"), None);
        assert_eq!(root.candidate("/..%5csecret"), None);
    }

    #[tokio::test]
    async fn test_resolve_request_existing_file() {
        let (_dir, root) = site();

        let resolved = root.resolve_request("/guide/page%20two.css").await;

        assert_eq!(
            resolved,
            Some(RequestTarget::File(root.path().join("guide").join("page two.css")))
        );
    }

    #[tokio::test]
    async fn test_resolve_request_directory_index() {
        let (_dir, root) = site();

        assert_eq!(
            root.resolve_request("/guide/").await,
            Some(RequestTarget::File(root.path().join("guide").join("index.html")))
        );
        assert_eq!(
            root.resolve_request("/").await,
            Some(RequestTarget::File(root.path().join("index.html")))
        );
    }

    #[tokio::test]
    async fn test_resolve_request_directory_without_slash() {
        let (dir, root) = site();
        fs::create_dir(dir.path().join("empty")).unwrap();

        assert_eq!(root.resolve_request("/guide").await, Some(RequestTarget::Directory));
        assert_eq!(root.resolve_request("/empty").await, None);
        assert_eq!(root.resolve_request("/empty/").await, None);
    }

    #[tokio::test]
    async fn test_resolve_request_missing() {
        let (_dir, root) = site();

        assert_eq!(root.resolve_request("/missing.js").await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_request_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let (dir, root) = site();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link.txt"))
            .unwrap();

        assert_eq!(root.resolve_request("/link.txt").await, None);
    }
}
