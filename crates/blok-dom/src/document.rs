//! Document - High-level host document API

use crate::{DomResult, DomTree, HostDocument, HostTarget, ListenerKey, ListenerRegistry, NodeId};

/// In-memory host document
#[derive(Debug)]
pub struct Document {
    /// The host tree
    pub tree: DomTree,
    /// Cached reference to <body>
    body_element: NodeId,
    listeners: ListenerRegistry,
}

impl Document {
    /// Create a document with a `<body>` mount point
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let body = tree.create_element("body");
        // root is a document node and body is fresh, so this cannot fail
        let _ = tree.append_child(tree.root(), body);
        Self {
            tree,
            body_element: body,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the host tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Listener bookkeeping
    pub fn listener_registry(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Class string of an element (empty when it has none)
    pub fn class_of(&self, id: NodeId) -> String {
        self.tree.attribute(id, "class").unwrap_or_default()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.tree.attribute(id, name)
    }

    /// Tag name of an element
    pub fn tag_of(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Serialize a subtree to HTML
    pub fn to_html(&self, id: NodeId) -> String {
        self.tree.to_html(id)
    }

    /// Serialize the children of <body>
    pub fn body_html(&self) -> String {
        self.tree
            .children(self.body_element)
            .map(|(id, _)| self.tree.to_html(id))
            .collect()
    }

    /// Find the first connected element with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_element_with_id(self.tree.root(), id)
    }

    fn find_element_with_id(&self, start: NodeId, target: &str) -> Option<NodeId> {
        for (node_id, node) in self.tree.children(start) {
            if node.as_element().and_then(|e| e.attr("id")) == Some(target) {
                return Some(node_id);
            }
            if let Some(found) = self.find_element_with_id(node_id, target) {
                return Some(found);
            }
        }
        None
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDocument for Document {
    fn create_node(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    fn set_class(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        self.tree.set_attribute(node, "class", class)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.tree.set_attribute(node, name, value)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.append_child(parent, child)
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> DomResult<()> {
        self.tree.insert_before(parent, child, reference)
    }

    fn remove_node(&mut self, node: NodeId) -> DomResult<()> {
        self.tree.detach(node)
    }

    fn add_event_listener(&mut self, target: HostTarget, event: &str, key: ListenerKey) {
        tracing::trace!(?target, event, key = key.0, "add listener");
        self.listeners.add(target, event, key);
    }

    fn remove_event_listener(&mut self, target: HostTarget, event: &str, key: ListenerKey) {
        tracing::trace!(?target, event, key = key.0, "remove listener");
        self.listeners.remove(target, event, key);
    }

    fn listeners(&self, target: HostTarget, event: &str) -> Vec<ListenerKey> {
        self.listeners.get(target, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_body() {
        let doc = Document::new();
        assert_eq!(doc.tag_of(doc.body()), Some("body"));
        assert!(doc.tree().is_connected(doc.body()));
        assert_eq!(doc.body_html(), "");
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new();
        let div = doc.create_node("div");
        doc.set_attribute(div, "id", "main").unwrap();
        assert_eq!(doc.get_element_by_id("main"), None);

        let body = doc.body();
        doc.append_child(body, div).unwrap();
        assert_eq!(doc.get_element_by_id("main"), Some(div));
    }
}
