//! One page's worth of picking and previewing.
//!
//! A [`Session`] owns the parsed document, the [`Navigator`] driving the
//! interactive phase and, after a confirmed selection, the [`PreviewSync`]
//! seeded with the converted Markdown. Conversion failures never leave the
//! navigator stuck: the error becomes a notice and selection ends anyway.

use std::rc::Rc;

use crate::config::{FilterConfig, KeyEvent, ShortcutConfig};
use crate::dom_tree::NodeId;
use crate::navigator::{Effect, InputEvent, Navigator};
use crate::parse::Document;
use crate::pipeline::Pipeline;
use crate::preview::{PreviewRenderer, PreviewSync, default_renderer};

pub struct Session {
    document: Document,
    navigator: Navigator<NodeId>,
    pipeline: Pipeline,
    renderer: Option<Rc<dyn PreviewRenderer>>,
    preview: Option<PreviewSync>,
    notices: Vec<String>,
}

impl Session {
    /// Session using the built-in conversion and rendering engines.
    pub fn new(document: Document, filters: FilterConfig, shortcut: ShortcutConfig) -> Self {
        Self::with_parts(document, Navigator::new(shortcut), Pipeline::new(filters), default_renderer())
    }

    /// Session with explicit collaborators.
    ///
    /// Missing engines are reported once here, as warnings and notices.
    pub fn with_parts(
        document: Document, navigator: Navigator<NodeId>, pipeline: Pipeline,
        renderer: Option<Rc<dyn PreviewRenderer>>,
    ) -> Self {
        let mut notices = Vec::new();

        if !pipeline.converter().is_available() {
            tracing::warn!("HTML to Markdown engine unavailable; confirmations will fail");
            notices.push("HTML to Markdown engine is unavailable".to_string());
        }
        if renderer.is_none() {
            tracing::warn!("Markdown to HTML engine unavailable; preview will show source only");
            notices.push("Markdown to HTML engine is unavailable".to_string());
        }

        Self { document, navigator, pipeline, renderer, preview: None, notices }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn navigator(&self) -> &Navigator<NodeId> {
        &self.navigator
    }

    pub fn is_selecting(&self) -> bool {
        self.navigator.is_selecting()
    }

    /// Apply one input event; a confirmation runs the conversion pipeline.
    ///
    /// Activation is ignored while a preview is open.
    pub fn dispatch(&mut self, event: InputEvent<NodeId>) -> Vec<Effect<NodeId>> {
        if event == InputEvent::Activate && self.preview.is_some() {
            tracing::debug!("preview open, ignoring activation");
            return Vec::new();
        }

        let effects = self.navigator.dispatch(self.document.tree(), event);
        self.run_confirmations(&effects);
        effects
    }

    /// Apply a raw key press.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Vec<Effect<NodeId>> {
        if self.preview.is_some() && self.navigator.shortcut().matches(key) {
            tracing::debug!("preview open, ignoring activation chord");
            return Vec::new();
        }

        let effects = self.navigator.handle_key(self.document.tree(), key);
        self.run_confirmations(&effects);
        effects
    }

    pub fn preview(&self) -> Option<&PreviewSync> {
        self.preview.as_ref()
    }

    pub fn preview_mut(&mut self) -> Option<&mut PreviewSync> {
        self.preview.as_mut()
    }

    /// Close the open preview and return its final Markdown.
    pub fn dismiss_preview(&mut self) -> Option<String> {
        self.preview.take().map(PreviewSync::dismiss)
    }

    /// Messages meant for the user, oldest first; draining clears them.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    fn run_confirmations(&mut self, effects: &[Effect<NodeId>]) {
        for effect in effects {
            let Effect::Confirm(node) = effect else { continue };

            match self.pipeline.convert_selection(&self.document, *node) {
                Ok(markdown) => {
                    self.preview = Some(PreviewSync::new(markdown, self.renderer.clone()));
                }
                Err(e) => {
                    tracing::error!(error = %e, "conversion failed");
                    self.notices.push(format!("Conversion failed: {e}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::{MarkdownConverter, MarkdownEngine};
    use crate::{MdPickError, Result};

    struct Passthrough;

    impl MarkdownEngine for Passthrough {
        fn convert(&self, html: &str) -> Result<String> {
            Ok(html.to_string())
        }
    }

    struct Broken;

    impl MarkdownEngine for Broken {
        fn convert(&self, _html: &str) -> Result<String> {
            Err(MdPickError::Conversion("engine crashed".to_string()))
        }
    }

    struct Bold;

    impl PreviewRenderer for Bold {
        fn render(&self, markdown: &str) -> String {
            format!("<b>{markdown}</b>")
        }
    }

    const PAGE: &str = r#"<html><body><div id="main"><p>One</p><script>x</script></div></body></html>"#;

    fn session(engine: Option<Box<dyn MarkdownEngine>>, renderer: Option<Rc<dyn PreviewRenderer>>) -> Session {
        let converter = match engine {
            Some(engine) => MarkdownConverter::new(engine),
            None => MarkdownConverter::unavailable(),
        };
        Session::with_parts(
            Document::parse(PAGE).unwrap(),
            Navigator::new(ShortcutConfig::default()),
            Pipeline::with_converter(FilterConfig::default(), converter),
            renderer,
        )
    }

    #[test]
    fn test_confirm_seeds_preview() {
        let mut session = session(Some(Box::new(Passthrough)), Some(Rc::new(Bold)));
        assert!(session.take_notices().is_empty());

        session.dispatch(InputEvent::Activate);
        let effects = session.dispatch(InputEvent::Press { in_overlay: false });

        assert!(matches!(effects.first(), Some(Effect::Confirm(_))));
        assert!(!session.is_selecting());

        let preview = session.preview().unwrap();
        assert_eq!(preview.markdown(), r#"<div id="main"><p>One</p></div>"#);
        assert_eq!(preview.rendered_html(), Some(r#"<b><div id="main"><p>One</p></div></b>"#));
    }

    #[test]
    fn test_conversion_failure_ends_session() {
        let mut session = session(Some(Box::new(Broken)), Some(Rc::new(Bold)));

        session.dispatch(InputEvent::Activate);
        let effects = session.dispatch(InputEvent::Press { in_overlay: false });

        assert!(effects.contains(&Effect::RestoreScroll));
        assert!(!session.is_selecting());
        assert!(session.preview().is_none());

        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("engine crashed"));
    }

    #[test]
    fn test_missing_collaborators_reported_once() {
        let mut session = session(None, None);

        let notices = session.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(session.take_notices().is_empty());

        session.dispatch(InputEvent::Activate);
        session.dispatch(InputEvent::Press { in_overlay: false });

        assert!(session.preview().is_none());
        assert!(session.take_notices()[0].contains("unavailable"));
    }

    #[test]
    fn test_preview_without_renderer_keeps_source() {
        let mut session = session(Some(Box::new(Passthrough)), None);
        session.take_notices();

        session.dispatch(InputEvent::Activate);
        session.dispatch(InputEvent::Press { in_overlay: false });

        let preview = session.preview().unwrap();
        assert!(preview.rendered_html().is_none());
        assert!(preview.markdown().contains("One"));
    }

    #[test]
    fn test_keyboard_flow_and_dismiss() {
        let mut session = session(Some(Box::new(Passthrough)), Some(Rc::new(Bold)));
        let chord = KeyEvent { ctrl: true, key: "m".to_string(), ..KeyEvent::default() };

        session.handle_key(&chord);
        assert!(session.is_selecting());
        session.handle_key(&KeyEvent::plain("ArrowDown"));
        let current = session.navigator().current().unwrap();
        assert_eq!(session.document().tree().tag_name(current), Some("p"));

        session.dispatch(InputEvent::Press { in_overlay: false });
        session.preview_mut().unwrap().set_source("edited");

        assert_eq!(session.dismiss_preview(), Some("edited".to_string()));
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_cancel_does_not_convert() {
        let mut session = session(Some(Box::new(Passthrough)), Some(Rc::new(Bold)));

        session.dispatch(InputEvent::Activate);
        session.handle_key(&KeyEvent::plain("Escape"));

        assert!(!session.is_selecting());
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_activation_ignored_while_previewing() {
        let mut session = session(Some(Box::new(Passthrough)), Some(Rc::new(Bold)));
        let chord = KeyEvent { ctrl: true, key: "m".to_string(), ..KeyEvent::default() };

        session.dispatch(InputEvent::Activate);
        session.dispatch(InputEvent::Press { in_overlay: false });
        session.preview_mut().unwrap().set_source("kept");

        assert!(session.dispatch(InputEvent::Activate).is_empty());
        assert!(session.handle_key(&chord).is_empty());
        assert!(!session.is_selecting());

        session.dispatch(InputEvent::Press { in_overlay: false });
        assert_eq!(session.preview().unwrap().markdown(), "kept");

        session.dismiss_preview();
        session.dispatch(InputEvent::Activate);
        assert!(session.is_selecting());
    }
}
