//! Rule-based sanitizing of a selected subtree.
//!
//! The parsed page is cloned first, so the live document is never touched.
//! Rules run on the clone in a fixed order: attribute filtering, then removal
//! by tag, class and id. Each stage only looks at nodes still attached under
//! the selected root, and the result is serialized by scraper.
//!
//! The selected root itself is exempt from removal; only its descendants can be
//! dropped. Its attributes are filtered like any other element's.

use scraper::{ElementRef, Html, Node};

use crate::config::FilterConfig;
use crate::dom_tree::NodeId;
use crate::parse::Document;

/// A sanitized copy of the page, scoped to one selected element.
pub struct Sanitized {
    html: Html,
    root: ego_tree::NodeId,
}

impl Sanitized {
    /// The sanitized selection.
    pub fn element(&self) -> Option<ElementRef<'_>> {
        self.html.tree.get(self.root).and_then(ElementRef::wrap)
    }

    /// Outer HTML of the sanitized selection.
    pub fn outer_html(&self) -> String {
        self.element().map(|el| el.html()).unwrap_or_default()
    }
}

/// Clone the page behind `doc` and apply every rule in `config` under `node`.
///
/// Returns `None` when `node` does not come from `doc`.
pub fn sanitize_tree(doc: &Document, node: NodeId, config: &FilterConfig) -> Option<Sanitized> {
    let root = doc.tree().source(node)?;
    let mut html = doc.html().clone();

    filter_attributes(&mut html, root, config);
    remove_tags(&mut html, root, config);
    remove_by_class(&mut html, root, config);
    remove_by_id(&mut html, root, config);

    Some(Sanitized { html, root })
}

/// Sanitize the subtree at `node` and serialize it as outer HTML.
pub fn sanitize_element(doc: &Document, node: NodeId, config: &FilterConfig) -> String {
    let html = sanitize_tree(doc, node, config).map(|s| s.outer_html()).unwrap_or_default();
    tracing::debug!(bytes = html.len(), "sanitized selection");
    html
}

fn filter_attributes(html: &mut Html, root: ego_tree::NodeId, config: &FilterConfig) {
    if config.remove_attributes.is_empty() {
        return;
    }

    let patterns = config.attribute_patterns();

    for id in elements(html, root) {
        let Some(mut node) = html.tree.get_mut(id) else { continue };
        if let Node::Element(element) = node.value() {
            let tag = element.name().to_string();
            element
                .attrs
                .retain(|name, _| !config.should_remove_attribute(&tag, &name.local, &patterns));
        }
    }
}

fn remove_tags(html: &mut Html, root: ego_tree::NodeId, config: &FilterConfig) {
    if config.remove_tags.is_empty() {
        return;
    }

    let doomed: Vec<_> = descendant_elements(html, root)
        .into_iter()
        .filter(|id| element(html, *id).is_some_and(|el| config.removes_tag(el.name())))
        .collect();

    detach_all(html, doomed);
}

/// Class and id are read from the attributes; scraper's cached lookups go
/// stale once attributes are edited.
fn remove_by_class(html: &mut Html, root: ego_tree::NodeId, config: &FilterConfig) {
    for class in &config.remove_elements_with_classes {
        let doomed: Vec<_> = descendant_elements(html, root)
            .into_iter()
            .filter(|id| {
                element(html, *id)
                    .and_then(|el| el.attr("class"))
                    .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            })
            .collect();

        detach_all(html, doomed);
    }
}

/// Only the first match per id is removed.
fn remove_by_id(html: &mut Html, root: ego_tree::NodeId, config: &FilterConfig) {
    for wanted in &config.remove_elements_with_ids {
        let first = descendant_elements(html, root)
            .into_iter()
            .find(|id| element(html, *id).and_then(|el| el.attr("id")) == Some(wanted.as_str()));

        detach_all(html, first);
    }
}

fn element(html: &Html, id: ego_tree::NodeId) -> Option<&scraper::node::Element> {
    html.tree.get(id)?.value().as_element()
}

/// Element ids under `root` in pre-order, `root` included
fn elements(html: &Html, root: ego_tree::NodeId) -> Vec<ego_tree::NodeId> {
    html.tree
        .get(root)
        .map(|node| node.descendants().filter(|n| n.value().is_element()).map(|n| n.id()).collect())
        .unwrap_or_default()
}

fn descendant_elements(html: &Html, root: ego_tree::NodeId) -> Vec<ego_tree::NodeId> {
    elements(html, root).into_iter().filter(|id| *id != root).collect()
}

fn detach_all(html: &mut Html, ids: impl IntoIterator<Item = ego_tree::NodeId>) {
    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn select(doc: &Document, css: &str) -> NodeId {
        doc.select_first(css).unwrap().unwrap()
    }

    #[test]
    fn test_removes_tags_with_subtree() {
        let doc = Document::parse(
            r#"<div id="root"><p>Keep</p><script>alert(1)</script><form><p>Gone</p></form></div>"#,
        )
        .unwrap();
        let html = sanitize_element(&doc, select(&doc, "#root"), &FilterConfig::default());

        assert_eq!(html, r#"<div id="root"><p>Keep</p></div>"#);
    }

    #[test]
    fn test_live_document_untouched() {
        let doc = Document::parse(r#"<div id="root" style="color: red"><script>x</script></div>"#).unwrap();
        let root = select(&doc, "#root");
        let before = doc.outer_html(root);

        sanitize_element(&doc, root, &FilterConfig::default());

        assert_eq!(doc.outer_html(root), before);
        assert!(before.unwrap().contains("<script>x</script>"));
    }

    #[test]
    fn test_attribute_filtering() {
        let doc = Document::parse(
            r#"<div id="root" style="x"><a href="/a" target="_blank" onclick="f()" data-id="7">A</a><img src="i.png" alt="I" style="w"></div>"#,
        )
        .unwrap();
        let html = sanitize_element(&doc, select(&doc, "#root"), &FilterConfig::default());

        assert_eq!(
            html,
            r#"<div id="root"><a href="/a" data-id="7">A</a><img src="i.png" alt="I"></div>"#
        );
    }

    #[test]
    fn test_keep_list_beats_patterns() {
        let config = FilterConfig {
            remove_attributes: vec!["href".to_string(), "data-\\w+".to_string()],
            ..FilterConfig::default()
        };
        let doc = Document::parse(r#"<div id="root"><a href="/a" data-x="1">A</a><span href="/s">S</span></div>"#)
            .unwrap();
        let html = sanitize_element(&doc, select(&doc, "#root"), &config);

        assert_eq!(html, r#"<div id="root"><a href="/a">A</a><span>S</span></div>"#);
    }

    #[test]
    fn test_remove_by_class() {
        let config = FilterConfig { remove_elements_with_classes: vec!["ad".to_string()], ..FilterConfig::empty() };
        let doc = Document::parse(
            r#"<div id="root" class="ad"><p class="ad banner">x</p><p class="adx">y</p><p class="note ad">z</p></div>"#,
        )
        .unwrap();
        let html = sanitize_element(&doc, select(&doc, "#root"), &config);

        assert_eq!(html, r#"<div id="root" class="ad"><p class="adx">y</p></div>"#);
    }

    #[test]
    fn test_remove_by_id_first_match_only() {
        let config = FilterConfig { remove_elements_with_ids: vec!["dup".to_string()], ..FilterConfig::empty() };
        let doc =
            Document::parse(r#"<div id="root"><p id="dup">one</p><p id="dup">two</p><p id="other">three</p></div>"#)
                .unwrap();
        let html = sanitize_element(&doc, select(&doc, "#root"), &config);

        assert_eq!(html, r#"<div id="root"><p id="dup">two</p><p id="other">three</p></div>"#);
    }

    #[test]
    fn test_empty_config_is_identity() {
        let doc = Document::parse(r#"<div id="root" style="x"><script>s</script><!--c--></div>"#).unwrap();
        let root = select(&doc, "#root");

        assert_eq!(
            sanitize_element(&doc, root, &FilterConfig::empty()),
            r#"<div id="root" style="x"><script>s</script><!--c--></div>"#
        );
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let config = FilterConfig {
            remove_elements_with_classes: vec!["ad".to_string()],
            remove_elements_with_ids: vec!["dup".to_string()],
            ..FilterConfig::default()
        };
        let doc = Document::parse(
            r#"<section id="root"><p id="dup" style="a">1</p><p id="keep">2</p><div class="ad">3</div><iframe></iframe><a href="/" target="x">4</a></section>"#,
        )
        .unwrap();
        let once = sanitize_element(&doc, select(&doc, "#root"), &config);

        let reparsed = Document::parse(&once).unwrap();
        let twice = sanitize_element(&reparsed, select(&reparsed, "#root"), &config);

        let expected = r#"<section id="root"><p id="keep">2</p><a href="/">4</a></section>"#;
        assert_eq!(once, expected);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_class_and_id_read_after_attribute_edits() {
        let config = FilterConfig {
            remove_attributes: vec!["id".to_string()],
            remove_elements_with_ids: vec!["gone".to_string()],
            ..FilterConfig::empty()
        };
        let doc = Document::parse(r#"<div id="root"><p id="gone">x</p><p>y</p></div>"#).unwrap();
        // Selecting by id warms scraper's id cache on the live document.
        let root = select(&doc, "#root");

        assert_eq!(sanitize_element(&doc, root, &config), "<div><p>x</p><p>y</p></div>");
    }

    #[test]
    fn test_text_node_has_no_sanitized_form() {
        let doc = Document::parse("<p>only text</p>").unwrap();
        let p = select(&doc, "p");
        let text = doc.tree().get(p).unwrap().children[0];

        assert!(sanitize_tree(&doc, text, &FilterConfig::default()).unwrap().element().is_none());
        assert_eq!(sanitize_element(&doc, text, &FilterConfig::default()), "");
    }
}
