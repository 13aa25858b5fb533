//! SCSS compilation via grass.

use std::path::PathBuf;

use grass::{Options, OutputStyle};

use super::{Document, Stage};
use crate::pipeline::BuildError;

/// Compile SCSS (or plain CSS) to compressed CSS.
///
/// `@use`/`@import` resolve against the file's own directory first, then
/// each configured load path in order.
#[derive(Debug, Clone)]
pub struct CompileScss {
    load_paths: Vec<PathBuf>,
}

impl CompileScss {
    pub fn new(load_paths: Vec<PathBuf>) -> Self {
        Self { load_paths }
    }
}

impl Stage for CompileScss {
    fn name(&self) -> &'static str {
        "scss"
    }

    fn apply(&self, mut doc: Document) -> Result<Document, BuildError> {
        let source_dir = doc.source_dir().to_path_buf();
        let options = self
            .load_paths
            .iter()
            .fold(
                Options::default()
                    .style(OutputStyle::Compressed)
                    .load_path(&source_dir),
                |options, path| options.load_path(path),
            );

        let css = grass::from_string(doc.text()?.to_owned(), &options)
            .map_err(|e| BuildError::compile(&doc.source, e))?;

        doc.relative.set_extension("css");
        Ok(doc.with_text(css))
    }
}
