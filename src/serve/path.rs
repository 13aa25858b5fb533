//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. Anything that escapes the
/// root, including through symlinks or encoded `..`, resolves to `None`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Strip query and fragment, percent-decode, trim slashes.
pub fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/blog")).unwrap();
        fs::write(dir.path().join("dist/index.html"), "home").unwrap();
        fs::write(dir.path().join("dist/blog/index.html"), "blog").unwrap();
        fs::write(dir.path().join("dist/app.css"), "a{}").unwrap();
        fs::write(dir.path().join("secret.txt"), "no").unwrap();
        dir
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/blog/?page=2"), "blog");
        assert_eq!(normalize_url("/a%20b.css#x"), "a b.css");
        assert_eq!(normalize_url("/"), "");
    }

    #[test]
    fn test_directory_resolves_index() {
        let dir = site();
        let root = dir.path().join("dist");
        assert_eq!(
            resolve_path("/", &root),
            Some(root.canonicalize().unwrap().join("index.html"))
        );
        assert_eq!(
            resolve_path("/blog/", &root),
            Some(root.canonicalize().unwrap().join("blog/index.html"))
        );
    }

    #[test]
    fn test_file_and_missing() {
        let dir = site();
        let root = dir.path().join("dist");
        assert!(resolve_path("/app.css?v=1", &root).is_some());
        assert!(resolve_path("/nope.css", &root).is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        let root = dir.path().join("dist");
        assert!(resolve_path("/../secret.txt", &root).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &root).is_none());
    }
}
