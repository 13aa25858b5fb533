//! Per-kind build pipelines.
//!
//! ```text
//! resolve(kind) ─▶ scan + read ─▶ stage 1 ─▶ .. ─▶ stage n ─▶ commit ─▶ Reloader::notify
//!                                 └──── per-stage timeout ────┘
//! ```
//!
//! Every invocation is computed fully in memory before anything is
//! written; a failing stage leaves the previous output untouched.
//!
//! | kind   | stages                                                        |
//! |--------|---------------------------------------------------------------|
//! | assets | (pass-through)                                                |
//! | css    | scss, replace.., postcss, strip..                             |
//! | js     | include (modules), include (vendor), transpile, [minify]      |
//! | html   | render                                                        |

mod error;
pub mod stage;
mod write;

pub use error::BuildError;
pub use write::Output;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::section::{CssConfig, JsConfig};
use crate::config::{ConfigError, KilnConfig};
use crate::core::AssetKind;
use crate::paths::{PathResolver, PatternSet};
use crate::reload::Reloader;
use stage::{
    CompileScss, Document, FileInclude, MinifyJs, PostProcess, Remove, RenderTemplate, Replace,
    Stage, Transpile,
};

/// Everything a build invocation reads. Immutable and shared by all kinds.
#[derive(Debug)]
pub struct BuildContext {
    /// Project root; configured paths are relative to it.
    pub root: PathBuf,
    pub resolver: PathResolver,
    pub css: CssConfig,
    pub js: JsConfig,
    /// Per-stage timeout, `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub reloader: Reloader,
}

impl BuildContext {
    pub fn new(config: &KilnConfig, reloader: Reloader) -> Result<Self, ConfigError> {
        Ok(Self {
            root: config.root.clone(),
            resolver: config.path_resolver()?,
            css: config.css.clone(),
            js: config.js.clone(),
            timeout: config.build.stage_timeout(),
            reloader,
        })
    }

    /// Absolute form of a root-relative configured path.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        self.root.join(path.strip_prefix("./").unwrap_or(path))
    }

    fn modules_dir(&self) -> PathBuf {
        self.absolute(&self.resolver.roots().modules)
    }

    /// The fixed, ordered stage list of `kind`.
    pub fn stages(&self, kind: AssetKind) -> Result<Vec<Arc<dyn Stage>>, ConfigError> {
        let mut stages: Vec<Arc<dyn Stage>> = Vec::new();
        match kind {
            AssetKind::Assets => {}
            AssetKind::Css => {
                let mut load_paths: Vec<PathBuf> =
                    self.css.include_paths.iter().map(|p| self.absolute(p)).collect();
                load_paths.push(self.modules_dir());

                stages.push(Arc::new(CompileScss::new(load_paths)));
                for r in &self.css.replace {
                    stages.push(Arc::new(Replace::new(&r.from, &r.to)));
                }
                stages.push(Arc::new(PostProcess::new(&self.css.browsers, self.css.minify)));
                for s in &self.css.strip {
                    stages.push(Arc::new(Remove(s.clone())));
                }
            }
            AssetKind::Js => {
                stages.push(Arc::new(FileInclude::new(
                    &self.js.include_prefix,
                    self.modules_dir(),
                )?));
                stages.push(Arc::new(FileInclude::new(
                    &self.js.vendor_prefix,
                    self.absolute(&self.js.vendor_root),
                )?));
                stages.push(Arc::new(Transpile::new(&self.js.target)?));
                if self.js.minify {
                    stages.push(Arc::new(MinifyJs));
                }
            }
            AssetKind::Html => {
                let templates = self.absolute(self.resolver.roots().src.get(AssetKind::Html));
                stages.push(Arc::new(RenderTemplate::new(vec![
                    self.modules_dir(),
                    templates,
                ])));
            }
        }
        Ok(stages)
    }
}

/// Outcome of a successful build invocation.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub kind: AssetKind,
    /// Absolute paths written, sorted by source path.
    pub written: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        let files = match self.written.len() {
            1 => "1 file".to_string(),
            n => format!("{n} files"),
        };
        format!(
            "{} ({}, {}ms)",
            self.kind.task_name(),
            files,
            self.elapsed.as_millis()
        )
    }
}

/// Run one build invocation of `kind`.
///
/// Errors are returned, never reported here: the caller decides between
/// log-and-continue (watch) and fail (one-shot).
pub async fn run_build(kind: AssetKind, ctx: Arc<BuildContext>) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let paths = ctx.resolver.resolve(kind);
    let patterns = PatternSet::new(&paths.src)?;
    let dist = ctx.absolute(&paths.dist);
    let stages = ctx.stages(kind)?;

    let root = ctx.root.clone();
    let mut docs = blocking("read", None, move || read_sources(&patterns, &root)).await?;
    crate::debug!(kind.name(); "{} source files", docs.len());

    for stage in stages {
        let name = stage.name();
        docs = blocking(name, ctx.timeout, move || {
            docs.into_iter().map(|doc| stage.apply(doc)).collect()
        })
        .await?;
    }

    let outputs: Vec<Output> = docs
        .into_iter()
        .map(|doc| Output {
            path: dist.join(&doc.relative),
            contents: doc.contents,
        })
        .collect();
    let written = blocking("write", None, move || write::commit(&outputs)).await?;

    if !written.is_empty() {
        ctx.reloader.notify(kind, &written);
    }

    Ok(BuildReport {
        kind,
        written,
        elapsed: started.elapsed(),
    })
}

fn read_sources(patterns: &PatternSet, root: &Path) -> Result<Vec<Document>, BuildError> {
    patterns
        .scan(root)?
        .into_iter()
        .map(|file| {
            let contents = fs::read(&file.path).map_err(|e| BuildError::io(&file.path, e))?;
            Ok(Document::new(file.path, file.relative, contents))
        })
        .collect()
}

/// Run blocking work off the async workers, bounded by `limit`.
///
/// A timed-out closure keeps running on its thread, but its result is
/// discarded and nothing is written.
async fn blocking<T, F>(stage: &'static str, limit: Option<Duration>, f: F) -> Result<T, BuildError>
where
    F: FnOnce() -> Result<T, BuildError> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(f);
    let joined = match limit {
        Some(after) => tokio::time::timeout(after, handle)
            .await
            .map_err(|_| BuildError::Timeout { stage, after })?,
        None => handle.await,
    };
    joined.map_err(|e| BuildError::Aborted {
        stage,
        message: e.to_string(),
    })?
}
