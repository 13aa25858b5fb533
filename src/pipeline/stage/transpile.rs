//! Downlevel transpilation via oxc.

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};

use super::{Document, Stage};
use crate::config::ConfigError;
use crate::pipeline::BuildError;

/// Lower modern syntax to `target`. Non-`.js` documents pass through.
#[derive(Debug, Clone)]
pub struct Transpile {
    options: TransformOptions,
}

impl Transpile {
    pub fn new(target: &str) -> Result<Self, ConfigError> {
        let options = TransformOptions::from_target(target)
            .map_err(|e| ConfigError::Validation(format!("[js] target `{target}`: {e}")))?;
        Ok(Self { options })
    }
}

impl Stage for Transpile {
    fn name(&self) -> &'static str {
        "transpile"
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

            let scoping = SemanticBuilder::new()
                .build(&program)
                .semantic
                .into_scoping();
            let transformed = Transformer::new(&allocator, &doc.source, &self.options)
                .build_with_scoping(scoping, &mut program);
            if let Some(error) = transformed.errors.first() {
                return Err(BuildError::compile(&doc.source, error));
            }

            Codegen::new().build(&program).code
        };
        Ok(doc.with_text(code))
    }
}
