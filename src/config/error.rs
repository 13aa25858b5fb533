//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::AssetKind;

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("unknown asset type `{0}` (expected one of: assets, css, js, html)")]
    UnknownAssetKind(String),

    #[error("missing {section} root path for `{key}`")]
    MissingRoot { section: &'static str, key: String },

    #[error("[files.{0}] compile list is empty")]
    EmptyCompile(AssetKind),

    #[error("[files.{kind}] compile pattern `{fragment}` is not covered by the watch list")]
    UnwatchedCompile { kind: AssetKind, fragment: String },

    #[error("invalid glob pattern `{pattern}`")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{0}")]
    Validation(String),
}
