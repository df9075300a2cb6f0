//! HTML parsing into a navigable document.
//!
//! This module provides the [`Document`] type, which parses HTML with scraper
//! and mirrors it into the arena [`DomTree`] that the navigator walks. CSS
//! selectors are resolved against the scraper document and mapped back to
//! arena node ids.
//!
//! # Example
//!
//! ```rust
//! use mdpick_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title>Notes</title></head>
//!         <body>
//!             <article><h1>Title</h1><p class="content">Paragraph</p></article>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraph = doc.select_first("p.content").unwrap().unwrap();
//! assert_eq!(doc.tree().text(paragraph), "Paragraph");
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::dom_tree::{DomTree, NodeId, build_dom_tree};
use crate::{MdPickError, Result};

/// Represents a parsed HTML document.
///
/// The scraper document is kept for selector matching, filtering and
/// serialization; navigation goes through [`Document::tree`].
pub struct Document {
    html: Html,
    tree: DomTree,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is error-tolerant: malformed markup is repaired the way a
    /// browser would, so this only fails on invariant violations.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        let tree = build_dom_tree(&html);
        Ok(Self { html, tree })
    }

    /// The arena tree mirroring this document.
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Finds the first element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`MdPickError::HtmlParseError`] if the selector is invalid.
    pub fn select_first(&self, selector: &str) -> Result<Option<NodeId>> {
        let sel =
            Selector::parse(selector).map_err(|e| MdPickError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        let Some(target) = self.html.select(&sel).next() else {
            return Ok(None);
        };

        Ok(self.locate(target))
    }

    /// The scraper element behind an arena node.
    pub fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        let source = self.tree.source(node)?;
        self.html.tree.get(source).and_then(ElementRef::wrap)
    }

    /// Serialized outer HTML of an element, straight from the parsed page.
    pub fn outer_html(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|el| el.html())
    }

    /// Map a scraper element to its arena node.
    fn locate(&self, target: ElementRef<'_>) -> Option<NodeId> {
        self.tree.find_source(target.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content" id="second">Paragraph 2</p>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("Test Page".to_string()));
        assert!(doc.tree().body().is_some());
    }

    #[test]
    fn test_select_first() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let node = doc.select_first("p.content").unwrap().unwrap();

        assert_eq!(doc.tree().text(node), "Paragraph 1");
    }

    #[test]
    fn test_select_by_id() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let node = doc.select_first("#second").unwrap().unwrap();

        assert_eq!(doc.tree().attr(node, "id"), Some("second"));
        assert_eq!(doc.tree().text(node), "Paragraph 2");
    }

    #[test]
    fn test_select_missing() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.select_first("table").unwrap(), None);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select_first("[[invalid");

        assert!(matches!(result, Err(MdPickError::HtmlParseError(_))));
    }

    #[test]
    fn test_outer_html_keeps_source_order() {
        let doc = Document::parse(r#"<p><a id="x" href="/a" data-id="7">A &amp; B</a><br></p>"#).unwrap();
        let node = doc.select_first("#x").unwrap().unwrap();

        assert_eq!(
            doc.outer_html(node).unwrap(),
            r#"<a id="x" href="/a" data-id="7">A &amp; B</a>"#
        );
        assert_eq!(doc.element(node).unwrap().value().name(), "a");
    }

    #[test]
    fn test_missing_title() {
        let doc = Document::parse("<p>No head</p>").unwrap();
        assert_eq!(doc.title(), None);
    }
}
