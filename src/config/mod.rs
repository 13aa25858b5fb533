//! Pipeline configuration management for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths.src], [paths.dist], [files.<kind>]
//! │   ├── css        # [css]
//! │   ├── js         # [js]
//! │   ├── build      # [build]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError
//! ├── util           # config file discovery
//! └── mod.rs         # KilnConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section          | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | `[paths.src]`    | Source bases per asset type plus `modules`     |
//! | `[paths.dist]`   | Destination bases per asset type               |
//! | `[files.<kind>]` | compile / ignore / watch glob fragments        |
//! | `[css]`          | Load paths, replacements, prefix targets       |
//! | `[js]`           | Include prefixes, vendor root, target          |
//! | `[build]`        | Per-stage timeout                              |
//! | `[serve]`        | Preview server (root, port, reload, open)      |
//!
//! The file is optional: without it every section takes its built-in
//! default and the current directory is the project root.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::core::AssetKind;
use crate::log;
use crate::paths::{PathResolver, PatternSet, RootPaths};
use crate::utils::path::normalize_path;
use section::{
    BuildConfig, CssConfig, FileRulesPatch, JsConfig, MODULES_KEY, PathsConfig, ServeConfig,
    default_file_rules,
};
use util::find_config_file;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory; all configured paths are relative to it
    #[serde(skip)]
    pub root: PathBuf,

    /// Root directory overrides
    #[serde(default)]
    pub paths: PathsConfig,

    /// Per-kind glob rule overrides
    #[serde(default)]
    pub files: BTreeMap<String, FileRulesPatch>,

    /// Style pipeline settings
    #[serde(default)]
    pub css: CssConfig,

    /// Script pipeline settings
    #[serde(default)]
    pub js: JsConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl KilnConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; the project root is
    /// its parent directory. Without a config file the built-in defaults
    /// apply and cwd is the root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(path);
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.root = normalize_path(&config.root);
        config.apply_cli(cli);
        // Surface configuration errors before anything starts
        config.path_resolver()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply CLI overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);
        if let Some(port) = cli.port {
            self.serve.port = port;
        }
        if cli.no_open {
            self.serve.open = false;
        }
    }

    /// Join a path with the project root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Merge path and file-rule overrides over the defaults and validate.
    ///
    /// Unknown asset types, empty roots, empty compile lists, compile
    /// fragments missing from `watch` and malformed globs are all errors.
    pub fn path_resolver(&self) -> Result<PathResolver, ConfigError> {
        let mut roots = RootPaths::default();

        for (key, value) in &self.paths.src {
            let base = normalize_base("paths.src", key, value)?;
            if key == MODULES_KEY {
                roots.modules = base;
            } else {
                *roots.src.get_mut(key.parse()?) = base;
            }
        }
        for (key, value) in &self.paths.dist {
            let base = normalize_base("paths.dist", key, value)?;
            *roots.dist.get_mut(key.parse()?) = base;
        }

        let mut files = default_file_rules();
        for (key, patch) in &self.files {
            let kind: AssetKind = key.parse()?;
            files.get_mut(kind).apply(patch);
        }

        for (kind, rules) in files.iter() {
            if rules.compile.is_empty() {
                return Err(ConfigError::EmptyCompile(kind));
            }
            if let Some(fragment) = rules.compile.iter().find(|c| !rules.watch.contains(*c)) {
                return Err(ConfigError::UnwatchedCompile {
                    kind,
                    fragment: fragment.clone(),
                });
            }
        }

        let resolver = PathResolver::new(roots, files);
        for kind in AssetKind::ALL {
            let set = resolver.resolve(kind);
            PatternSet::new(&set.src)?;
            PatternSet::new(&set.watch)?;
        }
        Ok(resolver)
    }
}

/// Reject empty bases and make sure the base ends with `/` so fragments
/// can be appended textually.
fn normalize_base(section: &'static str, key: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingRoot {
            section,
            key: key.to_string(),
        });
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/"))
    }
}

/// Parse a config string for tests, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> KilnConfig {
    let (parsed, ignored) = KilnConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_resolves_defaults() {
        let config = test_parse_config("");
        let resolver = config.path_resolver().unwrap();
        let defaults = PathResolver::default();
        for kind in AssetKind::ALL {
            assert_eq!(resolver.resolve(kind), defaults.resolve(kind));
        }
    }

    #[test]
    fn test_root_override_appends_slash() {
        let config = test_parse_config("[paths.src]\ncss = \"./styles\"\nmodules = \"./shared\"");
        let set = config.path_resolver().unwrap().resolve(AssetKind::Css);
        assert_eq!(set.src[0], "./styles/**/*.scss");
        assert_eq!(set.watch[1], "./shared/**/*.scss");
    }

    #[test]
    fn test_unknown_src_kind_rejected() {
        let config = test_parse_config("[paths.src]\nfonts = \"./src/fonts/\"");
        let err = config.path_resolver().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAssetKind(ref k) if k == "fonts"));
    }

    #[test]
    fn test_modules_not_a_dist_kind() {
        let config = test_parse_config("[paths.dist]\nmodules = \"./dist/modules/\"");
        assert!(matches!(
            config.path_resolver().unwrap_err(),
            ConfigError::UnknownAssetKind(_)
        ));
    }

    #[test]
    fn test_unknown_files_kind_rejected() {
        let config = test_parse_config("[files.ts]\ncompile = [\"**/*.ts\"]");
        assert!(matches!(
            config.path_resolver().unwrap_err(),
            ConfigError::UnknownAssetKind(ref k) if k == "ts"
        ));
    }

    #[test]
    fn test_empty_root_rejected() {
        let config = test_parse_config("[paths.dist]\ncss = \"  \"");
        assert!(matches!(
            config.path_resolver().unwrap_err(),
            ConfigError::MissingRoot { section: "paths.dist", ref key } if key == "css"
        ));
    }

    #[test]
    fn test_empty_compile_rejected() {
        let config = test_parse_config("[files.html]\ncompile = []");
        assert!(matches!(
            config.path_resolver().unwrap_err(),
            ConfigError::EmptyCompile(AssetKind::Html)
        ));
    }

    #[test]
    fn test_watch_must_cover_compile() {
        let config = test_parse_config("[files.js]\ncompile = [\"**/*.mjs\"]");
        assert!(matches!(
            config.path_resolver().unwrap_err(),
            ConfigError::UnwatchedCompile { kind: AssetKind::Js, ref fragment } if fragment == "**/*.mjs"
        ));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let config = test_parse_config(
            "[files.css]\ncompile = [\"**/[.scss\"]\nwatch = [\"**/[.scss\"]",
        );
        assert!(matches!(
            config.path_resolver().unwrap_err(),
            ConfigError::InvalidGlob { .. }
        ));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) = KilnConfig::parse_with_ignored("[serve]\nlivereload = true").unwrap();
        assert_eq!(ignored, ["serve.livereload"]);
    }

    #[test]
    fn test_malformed_toml() {
        let err = KilnConfig::parse_with_ignored("[serve\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
