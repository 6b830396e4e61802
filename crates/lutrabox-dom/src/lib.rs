//! In-memory HTML element tree for Lutrabox widgets.
//!
//! Provides the small DOM surface the widget builder and runtime rely on:
//! parsing a page into an [`Element`] tree, querying by tag, class and id,
//! inserting and wrapping nodes, editing attributes, classes and inline
//! styles, and serializing the result back to HTML.
//!
//! # Example
//!
//! ```
//! use lutrabox_dom::Document;
//!
//! let mut doc = Document::parse(r#"<pre class="example" id="out"></pre>"#).unwrap();
//! doc.root_mut().find_by_id_mut("out").unwrap().set_text_content("Loading...");
//! assert_eq!(doc.to_html(), r#"<pre class="example" id="out">Loading...</pre>"#);
//! ```

mod element;
mod entities;
mod error;
mod parser;
mod serializer;

pub use element::{Descendants, Element};
pub use error::DomError;

/// A parsed HTML page.
///
/// The page content hangs off a synthetic root element; a leading doctype
/// line is kept aside and written back unchanged.
#[derive(Debug, Clone)]
pub struct Document {
    doctype: Option<String>,
    root: Element,
}

impl Document {
    /// Parse an HTML document or fragment.
    ///
    /// # Errors
    ///
    /// Returns [`DomError`] if the markup cannot be read even after the
    /// HTML-to-XML normalization.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let parsed = parser::parse_html(html)?;
        Ok(Self {
            doctype: parsed.doctype,
            root: parsed.root,
        })
    }

    /// Build a document from already constructed nodes.
    #[must_use]
    pub fn from_children(children: Vec<Element>) -> Self {
        Self {
            doctype: None,
            root: Element::new(parser::ROOT_TAG).with_children(children),
        }
    }

    /// The synthetic root element.
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize the document back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str(doctype);
            out.push('\n');
        }
        serializer::serialize_children(&self.root, &mut out);
        out
    }
}

/// Serialize a single element (and its tail) to HTML.
#[must_use]
pub fn element_to_html(element: &Element) -> String {
    let mut out = String::new();
    serializer::serialize_node(element, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_preserves_structure() {
        let html = r#"<div class="weblutra"><div class="input"><p><textarea>a &lt; b</textarea></p></div><pre class="example" style="display:none;"></pre></div>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_round_trip_keeps_doctype() {
        let doc = Document::parse("<!DOCTYPE html><html><body>x</body></html>").unwrap();
        assert_eq!(
            doc.to_html(),
            "<!DOCTYPE html>\n<html><body>x</body></html>"
        );
    }

    #[test]
    fn test_from_children() {
        let doc = Document::from_children(vec![Element::new("p").with_text("hi")]);
        assert_eq!(doc.to_html(), "<p>hi</p>");
    }
}
