use crate::config::FilterConfig;
use crate::postprocess::postprocess_markdown;
use crate::{MdPickError, Result};

/// Engine turning sanitized HTML into raw Markdown.
///
/// Implementations are black boxes to the converter: it only relies on
/// `convert` and cleans the output up afterwards.
pub trait MarkdownEngine {
    fn convert(&self, html: &str) -> Result<String>;
}

/// HTML to Markdown engine backed by htmd.
///
/// Configured with ATX headings, fenced (backtick) code blocks, dashed
/// horizontal rules and `-` bullets. On top of htmd's tables it emits
/// `~~strikethrough~~` and `[x]` task-list markers. Comments and every tag
/// in `remove_tags` are dropped before conversion.
#[cfg(feature = "markdown")]
pub struct HtmdEngine {
    converter: htmd::HtmlToMarkdown,
    remove_tags: Vec<String>,
}

#[cfg(feature = "markdown")]
impl HtmdEngine {
    pub fn new(config: &FilterConfig) -> Self {
        use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, HrStyle, Options};

        let remove_tags: Vec<String> = config
            .remove_tags
            .iter()
            .filter(|tag| is_tag_name(tag))
            .map(|tag| tag.to_lowercase())
            .collect();

        let mut builder = htmd::HtmlToMarkdown::builder()
            .options(Options {
                heading_style: HeadingStyle::Atx,
                hr_style: HrStyle::Dashes,
                code_block_style: CodeBlockStyle::Fenced,
                code_block_fence: CodeBlockFence::Backticks,
                bullet_list_marker: BulletListMarker::Dash,
                ul_bullet_spacing: 1,
                ..Default::default()
            })
            .add_handler(vec!["del", "s", "strike"], strikethrough)
            .add_handler(vec!["input"], task_marker);

        // htmd rejects an empty skip list
        if !remove_tags.is_empty() {
            builder = builder.skip_tags(remove_tags.iter().map(String::as_str).collect());
        }

        let converter = builder.build();

        Self { converter, remove_tags }
    }
}

#[cfg(feature = "markdown")]
impl MarkdownEngine for HtmdEngine {
    fn convert(&self, html: &str) -> Result<String> {
        let stripped = strip_removed_nodes(html, &self.remove_tags);
        self.converter
            .convert(&stripped)
            .map_err(|e| MdPickError::Conversion(e.to_string()))
    }
}

/// `~~text~~`, keeping the surrounding whitespace outside the markers
#[cfg(feature = "markdown")]
fn strikethrough(
    handlers: &dyn htmd::element_handler::Handlers, element: htmd::Element<'_>,
) -> Option<htmd::element_handler::HandlerResult> {
    let content = handlers.walk_children(element.node).content;
    let inner = content.trim();
    if inner.is_empty() {
        return None;
    }

    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    Some(format!("{leading}~~{inner}~~{trailing}").into())
}

/// Checkboxes become task-list markers; other inputs have no Markdown form
#[cfg(feature = "markdown")]
fn task_marker(
    _handlers: &dyn htmd::element_handler::Handlers, element: htmd::Element<'_>,
) -> Option<htmd::element_handler::HandlerResult> {
    let attr = |name: &str| element.attrs.iter().find(|a| &*a.name.local == name).map(|a| &*a.value);

    if !attr("type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox")) {
        return None;
    }
    let marker = if attr("checked").is_some() { "[x] " } else { "[ ] " };
    Some(marker.into())
}

/// Remove comments and `remove_tags` elements with their content
#[cfg(feature = "markdown")]
fn strip_removed_nodes(html: &str, remove_tags: &[String]) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: remove_tags
                .iter()
                .map(|tag| {
                    lol_html::element!(tag.as_str(), |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            document_content_handlers: vec![lol_html::doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    output
}

/// Tag names that are safe to turn into CSS selectors
#[cfg(feature = "markdown")]
fn is_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Converts sanitized HTML to cleaned-up Markdown.
///
/// Without an engine every conversion fails with
/// [`MdPickError::CollaboratorUnavailable`].
pub struct MarkdownConverter {
    engine: Option<Box<dyn MarkdownEngine>>,
}

impl MarkdownConverter {
    pub fn new(engine: Box<dyn MarkdownEngine>) -> Self {
        Self { engine: Some(engine) }
    }

    /// A converter with no engine.
    pub fn unavailable() -> Self {
        Self { engine: None }
    }

    /// The built-in engine configured from `config`, if compiled in.
    pub fn from_filters(config: &FilterConfig) -> Self {
        #[cfg(feature = "markdown")]
        {
            Self::new(Box::new(HtmdEngine::new(config)))
        }
        #[cfg(not(feature = "markdown"))]
        {
            let _ = config;
            Self::unavailable()
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Convert, post-process and trim.
    ///
    /// Output depends only on `html` and the engine configuration.
    pub fn convert(&self, html: &str) -> Result<String> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(MdPickError::CollaboratorUnavailable("HTML to Markdown"))?;

        let markdown = engine.convert(html)?;
        Ok(postprocess_markdown(&markdown).trim().to_string())
    }
}

/// Convert HTML to Markdown with the built-in engine.
pub fn convert_to_markdown(html: &str, config: &FilterConfig) -> Result<String> {
    MarkdownConverter::from_filters(config).convert(html)
}
