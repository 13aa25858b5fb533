//! `[paths]` and `[files]` sections.
//!
//! Both sections are sparse overrides over the built-in tables below; a
//! key only needs to appear when it differs from the default.
//!
//! # Example
//!
//! ```toml
//! [paths.src]
//! css = "./styles/"
//! modules = "./shared/"
//!
//! [paths.dist]
//! html = "./public/"
//!
//! [files.js]
//! compile = ["**/*.js"]
//! ignore = ["**/_*.js", "**/*.test.js"]
//! watch = ["**/*.js", "**/_*.js"]
//! ```
//!
//! Keys are asset type names (`assets`, `css`, `js`, `html`); `[paths.src]`
//! additionally accepts `modules`. Any other key is a startup error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{AssetKind, PerKind};

/// Key under `[paths.src]` naming the shared modules directory.
pub const MODULES_KEY: &str = "modules";

/// Root directory overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source bases, keyed by asset type or `modules`.
    pub src: BTreeMap<String, String>,
    /// Destination bases, keyed by asset type.
    pub dist: BTreeMap<String, String>,
}

/// Glob fragments governing one asset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRules {
    /// Files to process.
    pub compile: Vec<String>,
    /// Files to exclude from `compile` (emitted as negated patterns).
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Files whose change re-triggers the build; covers `compile`.
    pub watch: Vec<String>,
}

/// Partial `[files.<kind>]` override; missing lists keep their default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRulesPatch {
    pub compile: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub watch: Option<Vec<String>>,
}

impl FileRules {
    fn new(compile: &[&str], ignore: &[&str], watch: &[&str]) -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            compile: owned(compile),
            ignore: owned(ignore),
            watch: owned(watch),
        }
    }

    /// Built-in rules for an asset type.
    pub fn default_for(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Assets => Self::new(
                &["**/*.*", "**/_*.*"],
                &[],
                &["**/*.*", "**/_*.*"],
            ),
            AssetKind::Css => Self::new(
                &["**/*.scss", "**/*.css"],
                &["**/_*.*"],
                &["**/*.scss", "**/*.css"],
            ),
            AssetKind::Js => Self::new(
                &["**/*.js", "**/*.json"],
                &["**/_*.js"],
                &["**/*.js", "**/*.json", "**/_*.js"],
            ),
            AssetKind::Html => Self::new(
                &["**/*.html"],
                &["**/_*.html"],
                &["**/*.html", "**/_*.html"],
            ),
        }
    }

    /// Apply a sparse override.
    pub fn apply(&mut self, patch: &FileRulesPatch) {
        if let Some(compile) = &patch.compile {
            self.compile.clone_from(compile);
        }
        if let Some(ignore) = &patch.ignore {
            self.ignore.clone_from(ignore);
        }
        if let Some(watch) = &patch.watch {
            self.watch.clone_from(watch);
        }
    }
}

/// Built-in source base for an asset type.
pub const fn default_src(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Assets => "./src/assets/",
        AssetKind::Css => "./src/scss/",
        AssetKind::Js => "./src/js/",
        AssetKind::Html => "./src/templates/",
    }
}

/// Built-in destination base for an asset type.
pub const fn default_dist(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Assets => "./dist/assets/",
        AssetKind::Css => "./dist/assets/css/",
        AssetKind::Js => "./dist/assets/js/",
        AssetKind::Html => "./dist/",
    }
}

/// Built-in shared modules base.
pub const DEFAULT_MODULES: &str = "./src/modules/";

/// Built-in rules for every asset type.
pub fn default_file_rules() -> PerKind<FileRules> {
    PerKind::from_fn(FileRules::default_for)
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    use super::*;

    #[test]
    fn test_paths_defaults_are_empty_overrides() {
        let config = test_parse_config("");
        assert!(config.paths.src.is_empty());
        assert!(config.paths.dist.is_empty());
        assert!(config.files.is_empty());
    }

    #[test]
    fn test_paths_override_parse() {
        let config = test_parse_config(
            "[paths.src]\ncss = \"./styles/\"\nmodules = \"./shared/\"\n[paths.dist]\nhtml = \"./public/\"",
        );
        assert_eq!(config.paths.src["css"], "./styles/");
        assert_eq!(config.paths.src[MODULES_KEY], "./shared/");
        assert_eq!(config.paths.dist["html"], "./public/");
    }

    #[test]
    fn test_file_rules_patch_keeps_missing_lists() {
        let config = test_parse_config("[files.js]\nignore = [\"**/*.test.js\"]");
        let mut rules = FileRules::default_for(AssetKind::Js);
        rules.apply(&config.files["js"]);

        assert_eq!(rules.compile, ["**/*.js", "**/*.json"]);
        assert_eq!(rules.ignore, ["**/*.test.js"]);
        assert_eq!(rules.watch, ["**/*.js", "**/*.json", "**/_*.js"]);
    }

    #[test]
    fn test_default_watch_covers_compile() {
        for (kind, rules) in default_file_rules().iter() {
            for fragment in &rules.compile {
                assert!(
                    rules.watch.contains(fragment),
                    "{kind}: `{fragment}` not watched"
                );
            }
        }
    }

    #[test]
    fn test_default_partials_ignored_but_watched() {
        let css = FileRules::default_for(AssetKind::Css);
        assert_eq!(css.ignore, ["**/_*.*"]);
        assert!(css.watch.iter().any(|w| w == "**/*.scss"));

        let html = FileRules::default_for(AssetKind::Html);
        assert_eq!(html.ignore, ["**/_*.html"]);
        assert!(html.watch.iter().any(|w| w == "**/_*.html"));
    }
}
