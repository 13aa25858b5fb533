//! File-include expansion for scripts.
//!
//! A directive `<prefix>include('path')` is replaced by the contents of
//! `path`, resolved against the stage's base directory. Included files are
//! expanded recursively against the same base.
//!
//! ```text
//! @include('util/dom.js');           -> ./src/modules/util/dom.js
//! @vendor_include('jquery/dist/jquery.min.js');
//!                                    -> ./node_modules/jquery/dist/jquery.min.js
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::{Document, Stage};
use crate::config::ConfigError;
use crate::pipeline::BuildError;

/// Nesting limit, reached only by runaway includes.
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct FileInclude {
    directive: Regex,
    base: PathBuf,
}

impl FileInclude {
    pub fn new(prefix: &str, base: PathBuf) -> Result<Self, ConfigError> {
        let pattern = format!(
            r#"{}include\([ \t]*['"]([^'"]+)['"][ \t]*\)"#,
            regex::escape(prefix)
        );
        let directive = Regex::new(&pattern)
            .map_err(|e| ConfigError::Validation(format!("include prefix `{prefix}`: {e}")))?;
        Ok(Self { directive, base })
    }

    fn expand(&self, text: &str, from: &Path, stack: &mut Vec<PathBuf>) -> Result<String, BuildError> {
        if stack.len() > MAX_DEPTH {
            return Err(BuildError::compile(from, "include nesting too deep"));
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.directive.captures_iter(text) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let path = self.base.join(target.as_str());
            if stack.contains(&path) {
                return Err(BuildError::compile(
                    from,
                    format!("include cycle through `{}`", target.as_str()),
                ));
            }
            let included = fs::read_to_string(&path).map_err(|e| {
                BuildError::compile(
                    from,
                    format!("cannot include `{}`: {e}", target.as_str()),
                )
            })?;

            stack.push(path.clone());
            let expanded = self.expand(&included, &path, stack)?;
            stack.pop();
            out.push_str(&expanded);
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl Stage for FileInclude {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, doc: Document) -> Result<Document, BuildError> {
        let mut stack = vec![doc.source.clone()];
        let text = self.expand(doc.text()?, &doc.source, &mut stack)?;
        Ok(doc.with_text(text))
    }
}
