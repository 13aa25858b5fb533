//! Processor stages.
//!
//! Each stage turns one [`Document`] into the next; a kind's pipeline is a
//! fixed ordered list of stages applied to every selected source file.
//!
//! - `scss`: SCSS compilation via grass (css)
//! - `text`: literal replacements and removals (css)
//! - `postcss`: prefixing and minification via lightningcss (css)
//! - `include`: `@include('..')` expansion (js)
//! - `transpile`: downlevel transpilation via oxc (js)
//! - `minify`: optional oxc minification (js)
//! - `render`: template rendering via minijinja (html)

mod include;
mod minify;
mod postcss;
mod render;
mod scss;
mod text;
mod transpile;

pub use include::FileInclude;
pub use minify::MinifyJs;
pub use postcss::PostProcess;
pub use render::RenderTemplate;
pub use scss::CompileScss;
pub use text::{Remove, Replace};
pub use transpile::Transpile;

use std::path::{Path, PathBuf};

use super::BuildError;

/// One source file moving through a pipeline.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute source path, used for diagnostics and relative lookups.
    pub source: PathBuf,
    /// Output path relative to the kind's dist directory.
    pub relative: PathBuf,
    pub contents: Vec<u8>,
}

impl Document {
    pub fn new(source: PathBuf, relative: PathBuf, contents: Vec<u8>) -> Self {
        Self {
            source,
            relative,
            contents,
        }
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> Result<&str, BuildError> {
        std::str::from_utf8(&self.contents)
            .map_err(|e| BuildError::compile(&self.source, format!("not valid UTF-8: {e}")))
    }

    /// Replace the contents with new text.
    pub fn with_text(mut self, text: String) -> Self {
        self.contents = text.into_bytes();
        self
    }

    pub fn extension(&self) -> Option<&str> {
        self.source.extension().and_then(|e| e.to_str())
    }

    /// Directory containing the source file.
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or(Path::new("."))
    }
}

/// A processor stage.
pub trait Stage: Send + Sync {
    /// Short name used in logs and timeout errors.
    fn name(&self) -> &'static str;

    fn apply(&self, doc: Document) -> Result<Document, BuildError>;
}
