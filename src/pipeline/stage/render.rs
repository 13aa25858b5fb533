//! Template rendering via minijinja.

use std::path::PathBuf;

use minijinja::{Environment, context, path_loader};

use super::{Document, Stage};
use crate::pipeline::BuildError;

/// Render each document as a template.
///
/// `{% include %}`, `{% extends %}` and `{% import %}` names resolve in the
/// search directories in order: the modules directory first, then the
/// template source root.
#[derive(Debug, Clone)]
pub struct RenderTemplate {
    search: Vec<PathBuf>,
}

impl RenderTemplate {
    pub fn new(search: Vec<PathBuf>) -> Self {
        Self { search }
    }

    fn environment<'source>(&self) -> Environment<'source> {
        let loaders: Vec<_> = self.search.iter().map(|dir| path_loader(dir.clone())).collect();
        let mut env = Environment::new();
        env.set_loader(move |name| {
            for load in &loaders {
                if let Some(source) = load(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(None)
        });
        env
    }
}

impl Stage for RenderTemplate {
    fn name(&self) -> &'static str {
        "render"
    }

    fn apply(&self, doc: Document) -> Result<Document, BuildError> {
        let name = doc.relative.to_string_lossy().replace('\\', "/");
        let rendered = {
            let env = self.environment();
            env.template_from_named_str(&name, doc.text()?)
                .and_then(|template| template.render(context! {}))
                .map_err(|e| BuildError::compile(&doc.source, e))?
        };
        Ok(doc.with_text(rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn page(text: &str) -> Document {
        Document::new("index.html".into(), "index.html".into(), text.as_bytes().to_vec())
    }

    #[test]
    fn test_include_from_modules() {
        let dir = TempDir::new().unwrap();
        let modules = dir.path().join("modules");
        fs::create_dir_all(modules.join("layout")).unwrap();
        fs::write(modules.join("layout/nav.html"), "<nav>{{ 1 + 1 }}</nav>").unwrap();

        let stage = RenderTemplate::new(vec![modules]);
        let out = stage
            .apply(page("<body>{% include \"layout/nav.html\" %}</body>"))
            .unwrap();
        assert_eq!(out.text().unwrap(), "<body><nav>2</nav></body>");
    }

    #[test]
    fn test_extends_from_source_root() {
        let dir = TempDir::new().unwrap();
        let modules = dir.path().join("modules");
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(
            templates.join("_base.html"),
            "<title>{% block title %}{% endblock %}</title>",
        )
        .unwrap();

        let stage = RenderTemplate::new(vec![modules, templates]);
        let out = stage
            .apply(page("{% extends \"_base.html\" %}{% block title %}Home{% endblock %}"))
            .unwrap();
        assert_eq!(out.text().unwrap(), "<title>Home</title>");
    }

    #[test]
    fn test_missing_include() {
        let stage = RenderTemplate::new(Vec::new());
        let err = stage
            .apply(page("{% include \"missing.html\" %}"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Compile { .. }));
    }

    #[test]
    fn test_syntax_error() {
        let stage = RenderTemplate::new(Vec::new());
        assert!(stage.apply(page("{% if %}")).is_err());
    }
}
