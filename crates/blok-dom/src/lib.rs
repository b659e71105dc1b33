//! blok DOM - Host document
//!
//! Arena-based document tree that a component runtime projects into.
//! Exposes the minimal attach surface ([`HostDocument`]) plus the
//! inspection helpers the runtime tests rely on.

mod classlist;
mod document;
mod events;
mod host;
mod node;
mod operations;
mod tree;

pub use classlist::ClassList;
pub use document::Document;
pub use events::{Event, HostTarget, ListenerKey, ListenerRegistry};
pub use host::HostDocument;
pub use node::{ElementData, Node, NodeData};
pub use operations::{DomError, DomResult};
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
