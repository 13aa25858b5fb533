//! JavaScript minification via oxc.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{Document, Stage};
use crate::pipeline::BuildError;

#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyJs;

impl Stage for MinifyJs {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, doc: Document) -> Result<Document, BuildError> {
        if doc.extension() != Some("js") {
            return Ok(doc);
        }

        let code = {
            let allocator = Allocator::default();
            let parsed = Parser::new(&allocator, doc.text()?, SourceType::mjs()).parse();
            if let Some(error) = parsed.errors.first() {
                return Err(BuildError::compile(&doc.source, error));
            }
            let mut program = parsed.program;

            let options = MinifierOptions {
                mangle: Some(MangleOptions::default()),
                compress: Some(CompressOptions::smallest()),
            };
            let ret = Minifier::new(options).minify(&allocator, &mut program);
            Codegen::new()
                .with_options(CodegenOptions {
                    minify: true,
                    comments: CommentOptions::disabled(),
                    ..CodegenOptions::default()
                })
                .with_scoping(ret.scoping)
                .build(&program)
                .code
        };
        Ok(doc.with_text(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_shrinks() {
        let source = "// comment\nfunction add(first, second) {\n  return first + second;\n}\nconsole.log(add(1, 2));\n";
        let doc = Document::new("a.js".into(), "a.js".into(), source.as_bytes().to_vec());
        let out = MinifyJs.apply(doc).unwrap();
        let text = out.text().unwrap();
        assert!(text.len() < source.len());
        assert!(!text.contains("comment"));
    }
}
