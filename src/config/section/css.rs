//! `[css]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [css]
//! include_paths = ["./node_modules"]   # extra @use/@import roots (modules dir is always added)
//! minify = true
//! strip = ["-webkit-box-align:center;", "-moz-box-align:center;"]
//!
//! [[css.replace]]                      # literal replacements before post-processing
//! from = "../img/"
//! to = "%%"
//!
//! [css.browsers]                       # vendor-prefix targets (major versions)
//! chrome = 49
//! safari = 10
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder token that a separate asset step resolves to real URLs.
pub const PLACEHOLDER: &str = "%%";

/// Style pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Additional SCSS load paths, relative to the project root.
    pub include_paths: Vec<PathBuf>,

    /// Ordered literal replacements applied after SCSS compilation.
    pub replace: Vec<Replacement>,

    /// Literal declarations removed after post-processing.
    pub strip: Vec<String>,

    /// Minify post-processed output.
    pub minify: bool,

    /// Browser targets for vendor prefixing.
    pub browsers: BrowserTargets,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            include_paths: vec![PathBuf::from("./node_modules")],
            replace: vec![
                Replacement::new("../img/", PLACEHOLDER),
                Replacement::new(".jpg", PLACEHOLDER),
                Replacement::new(".png", PLACEHOLDER),
            ],
            strip: vec![
                "-webkit-box-align:center;".into(),
                "-moz-box-align:center;".into(),
            ],
            minify: true,
            browsers: BrowserTargets::default(),
        }
    }
}

/// A literal, case-sensitive text substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Oldest browser major versions to support. `None` means no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserTargets {
    pub android: Option<u32>,
    pub chrome: Option<u32>,
    pub edge: Option<u32>,
    pub firefox: Option<u32>,
    pub ie: Option<u32>,
    pub ios_saf: Option<u32>,
    pub opera: Option<u32>,
    pub safari: Option<u32>,
    pub samsung: Option<u32>,
}

impl Default for BrowserTargets {
    /// Wide legacy support, so the old flexbox syntax still gets prefixed.
    fn default() -> Self {
        Self {
            android: Some(4),
            chrome: Some(49),
            edge: Some(14),
            firefox: Some(45),
            ie: Some(11),
            ios_saf: Some(9),
            opera: Some(36),
            safari: Some(9),
            samsung: Some(4),
        }
    }
}
