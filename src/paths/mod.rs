//! Path Resolver: derives glob patterns and output directories per asset kind.
//!
//! ```text
//! FileRules { compile, ignore, watch }  +  RootPaths
//!                    │
//!                    ▼  resolve(kind)
//! PathSet {
//!     src:   [<src>/<compile>.., !<src>/<ignore>..],
//!     dist:  <dist>,
//!     watch: [<src>/<w0>, <modules>/<w0>, <src>/<w1>, <modules>/<w1>, ..],
//! }
//! ```
//!
//! Resolution is a pure function of the startup configuration. Matching and
//! scanning of the resulting patterns lives in [`pattern`].

mod pattern;

pub use pattern::PatternSet;

use std::path::PathBuf;

use crate::config::section::{
    DEFAULT_MODULES, FileRules, default_dist, default_file_rules, default_src,
};
use crate::core::{AssetKind, PerKind};

/// Source and destination bases for every asset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPaths {
    pub src: PerKind<String>,
    /// Shared source root cross-cutting all kinds.
    pub modules: String,
    pub dist: PerKind<String>,
}

impl Default for RootPaths {
    fn default() -> Self {
        Self {
            src: PerKind::from_fn(|kind| default_src(kind).to_string()),
            modules: DEFAULT_MODULES.to_string(),
            dist: PerKind::from_fn(|kind| default_dist(kind).to_string()),
        }
    }
}

/// Resolved patterns and output directory for one asset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    /// Compile patterns followed by negated ignore patterns.
    pub src: Vec<String>,
    /// Output directory.
    pub dist: PathBuf,
    /// Kind-rooted and modules-rooted watch patterns, interleaved.
    pub watch: Vec<String>,
}

/// Maps asset kinds to their [`PathSet`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    roots: RootPaths,
    files: PerKind<FileRules>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(RootPaths::default(), default_file_rules())
    }
}

impl PathResolver {
    pub fn new(roots: RootPaths, files: PerKind<FileRules>) -> Self {
        Self { roots, files }
    }

    pub fn roots(&self) -> &RootPaths {
        &self.roots
    }

    pub fn rules(&self, kind: AssetKind) -> &FileRules {
        self.files.get(kind)
    }

    /// Resolve the patterns and output directory for `kind`.
    pub fn resolve(&self, kind: AssetKind) -> PathSet {
        let src_base = self.roots.src.get(kind);
        let modules_base = &self.roots.modules;
        let rules = self.files.get(kind);

        let src = rules
            .compile
            .iter()
            .map(|fragment| format!("{src_base}{fragment}"))
            .chain(
                rules
                    .ignore
                    .iter()
                    .map(|fragment| format!("!{src_base}{fragment}")),
            )
            .collect();

        let watch = rules
            .watch
            .iter()
            .flat_map(|fragment| {
                [
                    format!("{src_base}{fragment}"),
                    format!("{modules_base}{fragment}"),
                ]
            })
            .collect();

        PathSet {
            src,
            dist: PathBuf::from(self.roots.dist.get(kind)),
            watch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_src_compile_then_negated_ignore() {
        let resolver = PathResolver::default();
        for kind in AssetKind::ALL {
            let rules = resolver.rules(kind);
            let base = resolver.roots().src.get(kind);
            let set = resolver.resolve(kind);

            assert_eq!(set.src.len(), rules.compile.len() + rules.ignore.len());
            let (positive, negated) = set.src.split_at(rules.compile.len());
            for (pattern, fragment) in positive.iter().zip(&rules.compile) {
                assert_eq!(*pattern, format!("{base}{fragment}"));
            }
            for (pattern, fragment) in negated.iter().zip(&rules.ignore) {
                assert_eq!(*pattern, format!("!{base}{fragment}"));
            }
        }
    }

    #[test]
    fn test_watch_interleaves_kind_and_modules() {
        let resolver = PathResolver::default();
        for kind in AssetKind::ALL {
            let rules = resolver.rules(kind);
            let set = resolver.resolve(kind);

            assert_eq!(set.watch.len(), 2 * rules.watch.len());
            for (i, fragment) in rules.watch.iter().enumerate() {
                assert_eq!(
                    set.watch[2 * i],
                    format!("{}{fragment}", resolver.roots().src.get(kind))
                );
                assert_eq!(set.watch[2 * i + 1], format!("./src/modules/{fragment}"));
            }
        }
    }

    #[test]
    fn test_dist_is_configured_base() {
        let resolver = PathResolver::default();
        assert_eq!(resolver.resolve(AssetKind::Assets).dist, PathBuf::from("./dist/assets/"));
        assert_eq!(resolver.resolve(AssetKind::Css).dist, PathBuf::from("./dist/assets/css/"));
        assert_eq!(resolver.resolve(AssetKind::Js).dist, PathBuf::from("./dist/assets/js/"));
        assert_eq!(resolver.resolve(AssetKind::Html).dist, PathBuf::from("./dist/"));
    }

    #[test]
    fn test_dist_independent_of_rules() {
        let mut files = default_file_rules();
        *files.get_mut(AssetKind::Css) = FileRules {
            compile: vec!["main.scss".into()],
            ignore: vec![],
            watch: vec!["**/*".into()],
        };
        let resolver = PathResolver::new(RootPaths::default(), files);
        assert_eq!(
            resolver.resolve(AssetKind::Css).dist,
            PathResolver::default().resolve(AssetKind::Css).dist
        );
    }

    #[test]
    fn test_js_resolution_exact() {
        let set = PathResolver::default().resolve(AssetKind::Js);
        assert_eq!(
            set.src,
            [
                "./src/js/**/*.js",
                "./src/js/**/*.json",
                "!./src/js/**/_*.js",
            ]
        );
        assert_eq!(
            set.watch,
            [
                "./src/js/**/*.js",
                "./src/modules/**/*.js",
                "./src/js/**/*.json",
                "./src/modules/**/*.json",
                "./src/js/**/_*.js",
                "./src/modules/**/_*.js",
            ]
        );
    }

    #[test]
    fn test_assets_without_ignore() {
        let set = PathResolver::default().resolve(AssetKind::Assets);
        assert!(set.src.iter().all(|p| !p.starts_with('!')));
    }
}
