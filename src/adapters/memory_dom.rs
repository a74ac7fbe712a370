//! Headless document tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Element state
//! (classes, attributes, visibility) lives on the node itself, so a node
//! removed from the document takes its state with it.

use crate::config::site_config::Selectors;
use crate::domain::ports::{MutationCallback, PriceDom};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            hidden: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

pub struct MemoryDom {
    nodes: Vec<NodeData>,
    body: NodeId,
    observer: Option<MutationCallback>,
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDom")
            .field("nodes", &self.nodes.len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let body = NodeData::new(NodeKind::Element {
            tag: "body".to_string(),
        });
        Self {
            nodes: vec![body],
            body: NodeId(0),
            observer: None,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str, classes: &[&str]) -> NodeId {
        let mut data = NodeData::new(NodeKind::Element {
            tag: tag.to_string(),
        });
        data.classes = classes.iter().map(|c| c.to_string()).collect();
        self.push(data)
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.nodes[node.0].id = Some(id.to_string());
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.notify(1);
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.push(NodeData::new(NodeKind::Text(text.to_string())));
        self.append_child(parent, node);
        node
    }

    /// Removes `node` from its parent; the subtree stays in the arena but is
    /// no longer part of the document.
    pub fn remove(&mut self, node: NodeId) {
        if self.detach(node) {
            self.notify(1);
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == self.body {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.nodes[node.0].hidden
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    /// Text a reader would see: hidden subtrees and subtrees carrying one of
    /// `skip_classes` (screen-reader-only text) are left out.
    pub fn visible_text(&self, node: NodeId, skip_classes: &[&str]) -> String {
        let data = &self.nodes[node.0];
        if data.hidden || skip_classes.iter().any(|c| self.has_class(node, c)) {
            return String::new();
        }
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => data
                .children
                .iter()
                .map(|child| self.visible_text(*child, skip_classes))
                .collect(),
        }
    }

    /// Builds a structured price widget under `parent` in one mutation:
    /// hidden full-precision string, symbol, whole part and fraction.
    pub fn append_price_widget(
        &mut self,
        parent: NodeId,
        selectors: &Selectors,
        symbol: &str,
        whole: &str,
        fraction: &str,
    ) -> NodeId {
        let container = self.create_element("span", &[selectors.price_container.as_str()]);

        let offscreen = self.create_element("span", &[selectors.offscreen.as_str()]);
        self.attach_text(offscreen, &format!("{}{}.{}", symbol, whole, fraction));
        self.attach(container, offscreen);

        let display = self.create_element("span", &[]);
        self.nodes[display.0]
            .attributes
            .insert("aria-hidden".to_string(), "true".to_string());

        let symbol_el = self.create_element("span", &[selectors.symbol.as_str()]);
        self.attach_text(symbol_el, symbol);
        self.attach(display, symbol_el);

        let whole_el = self.create_element("span", &[selectors.whole.as_str()]);
        self.attach_text(whole_el, whole);
        let decimal = self.create_element("span", &[]);
        self.attach_text(decimal, ".");
        self.attach(whole_el, decimal);
        self.attach(display, whole_el);

        let fraction_el = self.create_element("span", &[selectors.fraction.as_str()]);
        self.attach_text(fraction_el, fraction);
        self.attach(display, fraction_el);

        self.attach(container, display);
        self.append_child(parent, container);
        container
    }

    /// A bare full-precision price string, as summary widgets render them.
    pub fn append_bare_price(&mut self, parent: NodeId, class: &str, text: &str) -> NodeId {
        let node = self.create_element("span", &[class]);
        self.attach_text(node, text);
        self.append_child(parent, node);
        node
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    // Links without notifying; only used while building detached subtrees.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn attach_text(&mut self, parent: NodeId, text: &str) {
        let node = self.push(NodeData::new(NodeKind::Text(text.to_string())));
        self.attach(parent, node);
    }

    fn detach(&mut self, node: NodeId) -> bool {
        match self.nodes[node.0].parent.take() {
            Some(parent) => {
                self.nodes[parent.0].children.retain(|c| *c != node);
                true
            }
            None => false,
        }
    }

    fn notify(&self, records: usize) {
        if let Some(callback) = &self.observer {
            callback(records);
        }
    }

    /// Pre-order walk of `root` and everything below it.
    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        order
    }

    fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { .. })
    }
}

impl PriceDom for MemoryDom {
    type Node = NodeId;

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.subtree(self.body)
            .into_iter()
            .filter(|n| self.is_element(*n) && self.has_class(*n, class))
            .collect()
    }

    fn elements_by_class_in_scope(&self, scope_id: &str, class: &str) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let scopes = self
            .subtree(self.body)
            .into_iter()
            .filter(|n| self.nodes[n.0].id.as_deref() == Some(scope_id));
        for scope in scopes {
            for node in self.subtree(scope).into_iter().skip(1) {
                if self.is_element(node) && self.has_class(node, class) && seen.insert(node) {
                    found.push(node);
                }
            }
        }
        found
    }

    fn find_in(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .find(|n| self.is_element(*n) && self.has_class(*n, class))
    }

    fn has_ancestor_with_class(&self, node: NodeId, class: &str) -> bool {
        let mut current = self.nodes[node.0].parent;
        while let Some(n) = current {
            if self.has_class(n, class) {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    fn text_content(&self, node: NodeId) -> String {
        self.subtree(node)
            .into_iter()
            .filter_map(|n| match &self.nodes[n.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect()
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            *existing = text.to_string();
            self.notify(1);
            return;
        }

        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.attach_text(node, text);
        }
        self.notify(1);
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attributes.remove(name);
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.nodes[node.0].hidden = hidden;
    }

    fn observe(&mut self, callback: MutationCallback) {
        self.observer = Some(callback);
    }
}
