//! Live preview of the converted Markdown.
//!
//! [`PreviewSync`] owns the editable Markdown source and its rendered HTML.
//! Every edit re-renders the whole document. The two panes scroll together
//! proportionally: scrolling one applies the same scroll fraction to the other.
//!
//! Programmatic scrolling makes the other pane report a scroll of its own. A
//! short-lived lock swallows that echo; it is released by the echo itself or
//! once [`SCROLL_LOCK_WINDOW`] has passed. Time is supplied by the caller, so
//! the component never spawns timers.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::{MdPickError, Result};

/// How long a programmatic scroll suppresses the echo from the other pane
pub const SCROLL_LOCK_WINDOW: Duration = Duration::from_millis(50);

/// Markdown to HTML renderer used for the preview pane.
pub trait PreviewRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer with GFM tables, strikethrough and task lists.
#[cfg(feature = "preview")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PulldownRenderer;

#[cfg(feature = "preview")]
impl PreviewRenderer for PulldownRenderer {
    fn render(&self, markdown: &str) -> String {
        use pulldown_cmark::{Options, Parser, html};

        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(markdown, options);

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

/// The built-in renderer, if compiled in.
pub fn default_renderer() -> Option<Rc<dyn PreviewRenderer>> {
    #[cfg(feature = "preview")]
    {
        Some(Rc::new(PulldownRenderer))
    }
    #[cfg(not(feature = "preview"))]
    {
        None
    }
}

/// Which half of the preview a scroll event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneKind {
    Source,
    Rendered,
}

impl PaneKind {
    fn other(self) -> Self {
        match self {
            PaneKind::Source => PaneKind::Rendered,
            PaneKind::Rendered => PaneKind::Source,
        }
    }
}

/// Scroll geometry of one pane, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pane {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl Pane {
    pub fn new(scroll_height: f64, viewport_height: f64) -> Self {
        Self { scroll_top: 0.0, scroll_height, viewport_height }
    }

    fn range(&self) -> f64 {
        self.scroll_height - self.viewport_height
    }

    /// Scroll offset over the scrollable range; `None` without overflow.
    pub fn fraction(&self) -> Option<f64> {
        let range = self.range();
        (range > 0.0).then(|| self.scroll_top / range)
    }

    /// Offset that puts this pane at `fraction` of its range, kept inside the range
    fn offset_for(&self, fraction: f64) -> f64 {
        let range = self.range().max(0.0);
        (fraction * range).clamp(0.0, range)
    }
}

/// Editable Markdown source kept in sync with its rendered view.
pub struct PreviewSync {
    source: String,
    rendered: Option<String>,
    renderer: Option<Rc<dyn PreviewRenderer>>,
    source_pane: Pane,
    rendered_pane: Pane,
    lock_until: Option<Instant>,
}

impl PreviewSync {
    /// Create a preview and render `markdown` right away.
    ///
    /// Without a renderer the source stays editable but no HTML is produced.
    pub fn new(markdown: String, renderer: Option<Rc<dyn PreviewRenderer>>) -> Self {
        let mut preview = Self {
            source: markdown,
            rendered: None,
            renderer,
            source_pane: Pane::default(),
            rendered_pane: Pane::default(),
            lock_until: None,
        };
        preview.render();
        preview
    }

    /// Preview using the built-in renderer.
    pub fn with_default_renderer(markdown: String) -> Self {
        Self::new(markdown, default_renderer())
    }

    /// Replace the source text and re-render the whole view.
    pub fn set_source(&mut self, markdown: impl Into<String>) {
        self.source = markdown.into();
        self.render();
    }

    /// Current (possibly edited) Markdown.
    pub fn markdown(&self) -> &str {
        &self.source
    }

    pub fn rendered_html(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    /// Rendered HTML, or why there is none.
    pub fn require_rendered_html(&self) -> Result<&str> {
        self.rendered_html()
            .ok_or(MdPickError::CollaboratorUnavailable("Markdown to HTML"))
    }

    pub fn pane(&self, kind: PaneKind) -> &Pane {
        match kind {
            PaneKind::Source => &self.source_pane,
            PaneKind::Rendered => &self.rendered_pane,
        }
    }

    /// Update a pane's content and viewport heights after layout.
    pub fn set_metrics(&mut self, kind: PaneKind, scroll_height: f64, viewport_height: f64) {
        let pane = self.pane_mut(kind);
        pane.scroll_height = scroll_height;
        pane.viewport_height = viewport_height;
    }

    pub fn is_scroll_locked(&self, now: Instant) -> bool {
        self.lock_until.is_some_and(|deadline| now < deadline)
    }

    /// Handle a scroll of `kind` to `scroll_top` observed at `now`.
    ///
    /// Returns the new scroll offset of the other pane, or `None` when the
    /// event was an echo or the scrolled pane has no overflow.
    pub fn scroll(&mut self, kind: PaneKind, scroll_top: f64, now: Instant) -> Option<f64> {
        self.pane_mut(kind).scroll_top = scroll_top;

        if self.lock_until.take().is_some_and(|deadline| now < deadline) {
            tracing::trace!(pane = ?kind, "swallowed scroll echo");
            return None;
        }

        let fraction = self.pane(kind).fraction()?;
        let target = self.pane_mut(kind.other());
        let offset = target.offset_for(fraction);
        target.scroll_top = offset;

        self.lock_until = Some(now + SCROLL_LOCK_WINDOW);
        Some(offset)
    }

    /// Close the preview, handing back the final Markdown.
    pub fn dismiss(self) -> String {
        tracing::debug!(bytes = self.source.len(), "preview dismissed");
        self.source
    }

    fn render(&mut self) {
        self.rendered = self.renderer.as_ref().map(|renderer| renderer.render(&self.source));
    }

    fn pane_mut(&mut self, kind: PaneKind) -> &mut Pane {
        match kind {
            PaneKind::Source => &mut self.source_pane,
            PaneKind::Rendered => &mut self.rendered_pane,
        }
    }
}
