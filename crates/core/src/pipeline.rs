//! Sanitize-then-convert pipeline run on a confirmed selection.

use crate::config::FilterConfig;
use crate::dom_tree::NodeId;
use crate::filter::sanitize_element;
use crate::formatters::MarkdownConverter;
use crate::parse::Document;
use crate::Result;

/// Filter rules plus the Markdown engine they were configured into.
pub struct Pipeline {
    filters: FilterConfig,
    converter: MarkdownConverter,
}

impl Pipeline {
    /// Pipeline using the built-in Markdown engine.
    pub fn new(filters: FilterConfig) -> Self {
        let converter = MarkdownConverter::from_filters(&filters);
        Self { filters, converter }
    }

    /// Pipeline with a caller-supplied converter.
    pub fn with_converter(filters: FilterConfig, converter: MarkdownConverter) -> Self {
        Self { filters, converter }
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn converter(&self) -> &MarkdownConverter {
        &self.converter
    }

    /// Sanitize a clone of `node` and convert it to Markdown.
    ///
    /// The live document is never modified.
    pub fn convert_selection(&self, doc: &Document, node: NodeId) -> Result<String> {
        let html = sanitize_element(doc, node, &self.filters);
        let markdown = self.converter.convert(&html)?;
        tracing::debug!(html_bytes = html.len(), markdown_bytes = markdown.len(), "converted selection");
        Ok(markdown)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}
