//! Attach surface consumed by the component runtime

use crate::{DomResult, HostTarget, ListenerKey, NodeId};

/// Minimal host document capability
///
/// Anything that can create nodes, set their class and attributes, link
/// them together and keep listener keys per target can host a component
/// tree. [`Document`](crate::Document) is the in-memory implementation.
pub trait HostDocument {
    /// Create a detached element
    fn create_node(&mut self, tag: &str) -> NodeId;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Replace the full class string of an element
    fn set_class(&mut self, node: NodeId, class: &str) -> DomResult<()>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;

    /// Insert before `reference`; NONE appends
    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> DomResult<()>;

    /// Detach a node (and its subtree) from the document
    fn remove_node(&mut self, node: NodeId) -> DomResult<()>;

    fn add_event_listener(&mut self, target: HostTarget, event: &str, key: ListenerKey);

    fn remove_event_listener(&mut self, target: HostTarget, event: &str, key: ListenerKey);

    /// Listener keys bound for a target, in binding order
    fn listeners(&self, target: HostTarget, event: &str) -> Vec<ListenerKey>;
}
