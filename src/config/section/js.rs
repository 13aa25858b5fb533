//! `[js]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [js]
//! vendor_root = "./node_modules"   # root for @vendor_include('...')
//! include_prefix = "@"             # @include('...') resolves in the modules dir
//! vendor_prefix = "@vendor_"
//! target = "es2016"                # downlevel target
//! minify = false
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Script pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsConfig {
    /// Root for vendor includes, relative to the project root.
    pub vendor_root: PathBuf,

    /// Directive prefix for includes resolved against the modules directory.
    pub include_prefix: String,

    /// Directive prefix for includes resolved against `vendor_root`.
    pub vendor_prefix: String,

    /// Syntax level scripts are lowered to.
    pub target: String,

    /// Minify transpiled output.
    pub minify: bool,
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            vendor_root: PathBuf::from("./node_modules"),
            include_prefix: "@".into(),
            vendor_prefix: "@vendor_".into(),
            target: "es2016".into(),
            minify: false,
        }
    }
}
