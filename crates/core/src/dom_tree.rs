//! Arena DOM used for navigation.
//!
//! Nodes live in a flat vector and refer to each other by [`NodeId`]. Every
//! node built from a parsed page remembers the scraper node it mirrors, so
//! filtering and serialization can go back to the scraper tree.

use scraper::{ElementRef, Html, Node};

use crate::navigator::TreeCursor;

/// Index of a node inside its [`DomTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a DOM node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Element { tag_name: String, attrs: Vec<(String, String)> },
    Text(String),
    Comment(String),
}

/// A node in the DOM tree
#[derive(Debug, Clone)]
pub struct DomNode {
    pub data: NodeData,
    /// Parent node ID (if any)
    pub parent: Option<NodeId>,
    /// Child node IDs, in document order
    pub children: Vec<NodeId>,
    /// The scraper node this one was copied from
    pub source: Option<ego_tree::NodeId>,
}

/// A DOM tree structure that tracks parent-child relationships
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![DomNode { data: NodeData::Document, parent: None, children: Vec::new(), source: None }] }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Append `data` as the last child of `parent`
    fn append(&mut self, parent: NodeId, data: NodeData, source: ego_tree::NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode { data, parent: Some(parent), children: Vec::new(), source: Some(source) });
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    /// Scraper node backing `id`
    pub fn source(&self, id: NodeId) -> Option<ego_tree::NodeId> {
        self.get(id)?.source
    }

    /// Arena node mirroring the scraper node `source`
    pub fn find_source(&self, source: ego_tree::NodeId) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.source == Some(source)).map(NodeId)
    }

    /// Lowercase tag name, `None` for non-elements
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag_name(id).is_some()
    }

    /// Attributes of an element, empty for other nodes
    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs.as_slice(),
            _ => &[],
        }
    }

    /// Gets the value of an attribute
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id).iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Parent node, element or document
    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Parent, only if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent_node(id).filter(|p| self.is_element(*p))
    }

    /// Element children in document order
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next()
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).last()
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        self.element_children(parent).skip_while(|c| *c != id).nth(1)
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        self.element_children(parent).take_while(|c| *c != id).last()
    }

    /// All attached nodes under `id` in pre-order, `id` included
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Element descendants of `id` in pre-order, `id` included when it is an element
    pub fn elements(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id).into_iter().filter(|n| self.is_element(*n)).collect()
    }

    /// The `<body>` element, if present
    pub fn body(&self) -> Option<NodeId> {
        let html = self.element_children(self.root()).find(|c| self.tag_name(*c) == Some("html"))?;
        self.element_children(html).find(|c| self.tag_name(*c) == Some("body"))
    }

    /// Concatenated text content of the subtree
    pub fn text(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match &self.get(n)?.data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeCursor for DomTree {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_element(node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.first_element_child(node)
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.last_element_child(node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.next_element_sibling(node)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.previous_element_sibling(node)
    }

    /// `<html>` and `<body>` both count as the document root.
    fn is_root(&self, node: NodeId) -> bool {
        matches!(self.tag_name(node), Some("html" | "body")) || node == self.root()
    }

    fn entry_point(&self) -> Option<NodeId> {
        let body = self.body()?;
        Some(self.first_element_child(body).unwrap_or(body))
    }
}

/// Build an arena tree from a parsed scraper document.
///
/// Elements, text and comments are copied; doctypes and processing
/// instructions are dropped.
pub fn build_dom_tree(html: &Html) -> DomTree {
    let mut tree = DomTree::new();
    let root = tree.root();
    copy_element(&mut tree, root, html.root_element());
    tree
}

fn copy_element(tree: &mut DomTree, parent: NodeId, element: ElementRef<'_>) {
    let value = element.value();
    let attrs = value.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let data = NodeData::Element { tag_name: value.name().to_lowercase(), attrs };
    let id = tree.append(parent, data, element.id());

    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    copy_element(tree, id, child_element);
                }
            }
            Node::Text(text) => {
                tree.append(id, NodeData::Text(text.to_string()), child.id());
            }
            Node::Comment(comment) => {
                tree.append(id, NodeData::Comment(comment.to_string()), child.id());
            }
            _ => {}
        }
    }
}
