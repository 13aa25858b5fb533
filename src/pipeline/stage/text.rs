//! Literal text stages.
//!
//! Both are plain substring operations: case-sensitive, no regex.

use super::{Document, Stage};
use crate::pipeline::BuildError;

/// Replace every occurrence of `from` with `to`.
#[derive(Debug, Clone)]
pub struct Replace {
    pub from: String,
    pub to: String,
}

impl Replace {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Stage for Replace {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn apply(&self, doc: Document) -> Result<Document, BuildError> {
        if self.from.is_empty() {
            return Ok(doc);
        }
        let text = doc.text()?.replace(&self.from, &self.to);
        Ok(doc.with_text(text))
    }
}

/// Delete every occurrence of a literal string.
#[derive(Debug, Clone)]
pub struct Remove(pub String);

impl Stage for Remove {
    fn name(&self) -> &'static str {
        "strip"
    }

    fn apply(&self, doc: Document) -> Result<Document, BuildError> {
        if self.0.is_empty() {
            return Ok(doc);
        }
        let text = doc.text()?.replace(&self.0, "");
        Ok(doc.with_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("a.css".into(), "a.css".into(), text.as_bytes().to_vec())
    }

    #[test]
    fn test_replace_all_occurrences() {
        let out = Replace::new("../img/", "%%")
            .apply(doc("a{background:url(../img/x.png)}b{background:url(../img/y.png)}"))
            .unwrap();
        assert_eq!(
            out.text().unwrap(),
            "a{background:url(%%x.png)}b{background:url(%%y.png)}"
        );
    }

    #[test]
    fn test_replace_is_case_sensitive() {
        let out = Replace::new(".png", "%%").apply(doc("url(a.PNG) url(b.png)")).unwrap();
        assert_eq!(out.text().unwrap(), "url(a.PNG) url(b%%)");
    }

    #[test]
    fn test_remove() {
        let out = Remove("-webkit-box-align:center;".into())
            .apply(doc(".a{-webkit-box-align:center;align-items:center}"))
            .unwrap();
        assert_eq!(out.text().unwrap(), ".a{align-items:center}");
    }
}
