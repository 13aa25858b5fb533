//! Errors raised by a single build invocation.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// A failed build invocation.
///
/// Every variant is isolated to the invocation that raised it: the previous
/// output stays in place and sibling kinds are unaffected.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    #[error("stage `{stage}` timed out after {}s", after.as_secs())]
    Timeout { stage: &'static str, after: Duration },

    #[error("stage `{stage}` aborted: {message}")]
    Aborted { stage: &'static str, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn compile(path: &Path, message: impl ToString) -> Self {
        Self::Compile {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
