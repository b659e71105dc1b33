//! Component nodes
//!
//! A node carries identity (name, derived selector), parameters, modifiers,
//! its lifecycle state and, once attached, the host node it projects to.
//! Nodes reference each other through [`NodeId`]s into the
//! [`NodeTree`](crate::NodeTree) arena.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use blok_dom::ListenerKey;
use serde_json::Value;

use crate::selector::{is_block_name, ELEMENT_SEPARATOR};
use crate::{ComposedDeclaration, HostRef, ModValue, Selector};

/// Node identifier (index into the runtime arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Per-node lifecycle state
///
/// `Unexpanded → Expanding → Expanded → Attached → Initialized → Ready`,
/// with `Removed` terminal and `Failed` marking a node whose hook raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Unexpanded,
    Expanding,
    Expanded,
    /// Host node exists, post-attach hook not run yet
    Attached,
    /// Post-attach hook ran and handlers are bound
    Initialized,
    /// Post-subtree hook ran
    Ready,
    Removed,
    Failed,
}

impl Lifecycle {
    /// Host representation exists
    pub fn is_attached(self) -> bool {
        matches!(self, Self::Attached | Self::Initialized | Self::Ready)
    }

    pub fn is_live(self) -> bool {
        self != Self::Removed
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Block,
    Element,
    Text(String),
}

/// Component node
#[derive(Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) selector: OnceCell<Selector>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) params: BTreeMap<String, Value>,
    pub(crate) mods: BTreeMap<String, ModValue>,
    pub(crate) id: Option<String>,
    /// Runtime-set document attributes
    pub(crate) dom_attrs: BTreeMap<String, String>,
    pub(crate) host: Option<HostRef>,
    pub(crate) state: Lifecycle,
    /// Resolved on first use; set eagerly for implement substitutes
    pub(crate) behavior: OnceCell<Option<Rc<ComposedDeclaration>>>,
    pub(crate) replaced_by: Option<NodeId>,
    /// Rounds of hook-produced content above this node; descriptor
    /// nesting does not count. Bounded by `max_expansion_depth`
    pub(crate) generation: usize,
    pub(crate) listeners: Vec<ListenerKey>,
}

impl Node {
    /// Block, element or `Block__element` node from a descriptor name
    pub(crate) fn component(name: &str) -> Self {
        let (kind, selector) = match name.split_once(ELEMENT_SEPARATOR) {
            Some(_) => (NodeKind::Element, Some(Selector::parse(name))),
            None if is_block_name(name) => (NodeKind::Block, Some(Selector::block(name))),
            None => (NodeKind::Element, None),
        };
        let cell = OnceCell::new();
        if let Some(selector) = selector {
            let _ = cell.set(selector);
        }
        Self {
            name: name.to_string(),
            kind,
            selector: cell,
            parent: None,
            children: Vec::new(),
            params: BTreeMap::new(),
            mods: BTreeMap::new(),
            id: None,
            dom_attrs: BTreeMap::new(),
            host: None,
            state: Lifecycle::Unexpanded,
            behavior: OnceCell::new(),
            replaced_by: None,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    /// Text run; never expanded
    pub(crate) fn text_run(content: &str) -> Self {
        let mut node = Self::component("");
        node.kind = NodeKind::Text(content.to_string());
        node.state = Lifecycle::Expanded;
        let _ = node.behavior.set(None);
        node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_block(&self) -> bool {
        self.kind == NodeKind::Block
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Descriptor-supplied parameters (defaults not included)
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Explicitly set modifiers (defaults not included)
    pub fn explicit_mods(&self) -> &BTreeMap<String, ModValue> {
        &self.mods
    }

    /// Assigned identifier
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn host(&self) -> Option<HostRef> {
        self.host
    }

    /// Node that replaced this one, if any
    pub fn replaced_by(&self) -> Option<NodeId> {
        self.replaced_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_run() {
        let node = Node::text_run("Home");
        assert!(node.is_text());
        assert_eq!(node.text(), Some("Home"));
        assert_eq!(node.state(), Lifecycle::Expanded);
        assert!(matches!(node.behavior.get(), Some(None)));
    }

    #[test]
    fn test_component_kinds() {
        let block = Node::component("TabBar");
        assert!(block.is_block());
        assert_eq!(block.text(), None);
        assert_eq!(block.selector.get().map(Selector::as_str), Some("tab-bar"));

        let explicit = Node::component("Tabs__tab");
        assert_eq!(explicit.kind(), &NodeKind::Element);
        assert_eq!(explicit.selector.get().map(Selector::as_str), Some("tabs__tab"));

        // plain elements learn their selector from the tree
        assert!(Node::component("title").selector.get().is_none());
    }
}
