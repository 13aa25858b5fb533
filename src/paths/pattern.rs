//! Ordered glob pattern sets with negation, and source-tree scanning.
//!
//! Patterns are evaluated left to right against a root-relative path:
//! a positive match includes the path, a `!`-prefixed match excludes it
//! again. So `["a/**/*.js", "!a/**/_*.js"]` keeps `a/app.js` and drops
//! `a/_util.js`, while appending `"a/**/_keep.js"` would re-include that
//! one file.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use jwalk::WalkDir;

use crate::config::ConfigError;
use crate::pipeline::BuildError;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// One compiled pattern.
#[derive(Debug, Clone)]
struct Pattern {
    negated: bool,
    matcher: GlobMatcher,
    /// Leading literal directory of the pattern.
    base: PathBuf,
}

/// An ordered list of glob patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

/// A file selected by a [`PatternSet`] scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the glob base, mirrored under the output directory.
    pub relative: PathBuf,
}

impl PatternSet {
    /// Compile an ordered pattern list. `!` marks a negation, a leading
    /// `./` is ignored.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|raw| compile(raw.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Check a root-relative path against the ordered patterns.
    pub fn is_match(&self, relative: &Path) -> bool {
        let candidate = to_slash(relative);
        self.patterns.iter().fold(false, |included, pattern| {
            if pattern.matcher.is_match(&candidate) {
                !pattern.negated
            } else {
                included
            }
        })
    }

    /// Distinct base directories of the positive patterns.
    pub fn bases(&self) -> Vec<PathBuf> {
        let mut bases: Vec<PathBuf> = Vec::new();
        for pattern in self.patterns.iter().filter(|p| !p.negated) {
            if !bases.contains(&pattern.base) {
                bases.push(pattern.base.clone());
            }
        }
        bases
    }

    /// Walk the pattern bases under `root` and return every matching file
    /// once, sorted by path.
    ///
    /// Symlinks are followed. An unreadable directory or a matching entry
    /// that cannot be resolved to a file fails the scan.
    pub fn scan(&self, root: &Path) -> Result<Vec<SourceFile>, BuildError> {
        let mut found = BTreeMap::new();

        for base in self.bases() {
            let dir = root.join(&base);
            if !dir.is_dir() {
                crate::debug!("scan"; "skip missing {}", dir.display());
                continue;
            }

            for entry in WalkDir::new(&dir).sort(true).follow_links(true) {
                let entry =
                    entry.map_err(|e| BuildError::io(&dir, io::Error::other(e.to_string())))?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let path = entry.path();
                let Ok(rel_root) = path.strip_prefix(root) else {
                    continue;
                };
                if found.contains_key(rel_root) || !self.is_match(rel_root) {
                    continue;
                }
                if !path.is_file() {
                    if entry.file_type().is_symlink() {
                        let err = io::Error::new(io::ErrorKind::NotFound, "dangling symlink");
                        return Err(BuildError::io(&path, err));
                    }
                    continue;
                }

                let relative = self.relative_to_base(rel_root);
                found.insert(rel_root.to_path_buf(), SourceFile { path, relative });
            }
        }

        Ok(found.into_values().collect())
    }

    /// Strip the base of the first positive pattern that matches.
    fn relative_to_base(&self, rel_root: &Path) -> PathBuf {
        let candidate = to_slash(rel_root);
        self.patterns
            .iter()
            .filter(|p| !p.negated && p.matcher.is_match(&candidate))
            .find_map(|p| rel_root.strip_prefix(&p.base).ok())
            .unwrap_or(rel_root)
            .to_path_buf()
    }
}

fn compile(raw: &str) -> Result<Pattern, ConfigError> {
    let (negated, glob) = match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let glob = strip_dot(glob);

    let matcher = GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::InvalidGlob {
            pattern: raw.to_string(),
            source,
        })?
        .compile_matcher();

    Ok(Pattern {
        negated,
        matcher,
        base: glob_base(glob),
    })
}

/// Leading run of literal path segments of a glob.
///
/// `src/scss/**/*.scss` → `src/scss`, `**/*.js` → `` (empty).
fn glob_base(glob: &str) -> PathBuf {
    let glob = strip_dot(glob.trim_start_matches('!'));
    let segments: Vec<&str> = glob.split('/').collect();
    // The last segment names files, never a directory
    let dirs = &segments[..segments.len().saturating_sub(1)];
    dirs.iter()
        .take_while(|segment| !segment.contains(GLOB_META))
        .filter(|segment| !segment.is_empty() && **segment != ".")
        .collect()
}

fn strip_dot(glob: &str) -> &str {
    let mut glob = glob;
    while let Some(rest) = glob.strip_prefix("./") {
        glob = rest;
    }
    glob
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("./src/scss/**/*.scss"), PathBuf::from("src/scss"));
        assert_eq!(glob_base("!./src/js/**/_*.js"), PathBuf::from("src/js"));
        assert_eq!(glob_base("src/a/b/*.txt"), PathBuf::from("src/a/b"));
        assert_eq!(glob_base("src/main.scss"), PathBuf::from("src"));
        assert_eq!(glob_base("**/*.js"), PathBuf::new());
        assert_eq!(glob_base("src/{a,b}/*.js"), PathBuf::from("src"));
    }

    #[test]
    fn test_negation_left_to_right() {
        let set = PatternSet::new(&["./src/js/**/*.js", "!./src/js/**/_*.js"]).unwrap();
        assert!(set.is_match(Path::new("src/js/app.js")));
        assert!(set.is_match(Path::new("src/js/nested/deep/app.js")));
        assert!(!set.is_match(Path::new("src/js/_util.js")));
        assert!(!set.is_match(Path::new("src/js/nested/_util.js")));
        assert!(!set.is_match(Path::new("src/css/app.js")));
    }

    #[test]
    fn test_later_positive_reincludes() {
        let set = PatternSet::new(&["src/**/*.js", "!src/**/_*.js", "src/**/_keep.js"]).unwrap();
        assert!(set.is_match(Path::new("src/_keep.js")));
        assert!(!set.is_match(Path::new("src/_drop.js")));
    }

    #[test]
    fn test_negation_alone_matches_nothing() {
        let set = PatternSet::new(&["!src/**/*.js"]).unwrap();
        assert!(!set.is_match(Path::new("src/app.js")));
        assert!(set.bases().is_empty());
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let set = PatternSet::new(&["src/*.css"]).unwrap();
        assert!(set.is_match(Path::new("src/a.css")));
        assert!(!set.is_match(Path::new("src/sub/a.css")));
    }

    #[test]
    fn test_invalid_glob() {
        let err = PatternSet::new(&["src/[a-.js"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { ref pattern, .. } if pattern == "src/[a-.js"));
    }

    #[test]
    fn test_bases_dedup() {
        let set = PatternSet::new(&[
            "./src/js/**/*.js",
            "./src/modules/**/*.js",
            "./src/js/**/*.json",
        ])
        .unwrap();
        assert_eq!(
            set.bases(),
            [PathBuf::from("src/js"), PathBuf::from("src/modules")]
        );
    }

    #[test]
    fn test_scan_mirrors_structure_and_skips_partials() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/scss/app.scss");
        touch(root, "src/scss/_vars.scss");
        touch(root, "src/scss/pages/home.scss");
        touch(root, "src/scss/pages/_mixins.scss");
        touch(root, "src/scss/vendor/reset.css");
        touch(root, "src/scss/notes.txt");

        let set = PatternSet::new(&[
            "./src/scss/**/*.scss",
            "./src/scss/**/*.css",
            "!./src/scss/**/_*.*",
        ])
        .unwrap();
        let files = set.scan(root).unwrap();
        let relative: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();

        assert_eq!(
            relative,
            [
                PathBuf::from("app.scss"),
                PathBuf::from("pages/home.scss"),
                PathBuf::from("vendor/reset.css"),
            ]
        );
        assert!(files.iter().all(|f| f.path.starts_with(root)));
    }

    #[test]
    fn test_scan_missing_base() {
        let dir = TempDir::new().unwrap();
        let set = PatternSet::new(&["./src/js/**/*.js"]).unwrap();
        assert!(set.scan(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_multiple_bases_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/js/app.js");
        touch(root, "src/js/data.json");

        let set = PatternSet::new(&["./src/js/**/*.js", "./src/js/**/*.json", "./src/**/*.js"]).unwrap();
        let files = set.scan(root).unwrap();
        assert_eq!(files.len(), 2);
        // relative to the first matching pattern's base
        assert_eq!(files[0].relative, PathBuf::from("app.js"));
        assert_eq!(files[1].relative, PathBuf::from("data.json"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinked_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "shared/theme.scss");
        fs::create_dir_all(root.join("src/scss")).unwrap();
        std::os::unix::fs::symlink(root.join("shared/theme.scss"), root.join("src/scss/theme.scss"))
            .unwrap();

        let set = PatternSet::new(&["./src/scss/**/*.scss"]).unwrap();
        let files = set.scan(root).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, PathBuf::from("theme.scss"));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_dangling_symlink_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/scss/app.scss");
        std::os::unix::fs::symlink(root.join("gone.scss"), root.join("src/scss/broken.scss"))
            .unwrap();

        let set = PatternSet::new(&["./src/scss/**/*.scss"]).unwrap();
        let err = set.scan(root).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
