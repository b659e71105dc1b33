//! Host node representation
//!
//! Nodes live in the [`DomTree`](crate::DomTree) arena. Structure is kept
//! as intrusive parent/child/sibling links of [`NodeId`]s; `NONE` marks a
//! missing link.

use crate::{ClassList, NodeId};

/// Host document node
#[derive(Debug)]
pub struct Node {
    pub parent: NodeId,
    pub first_child: NodeId,
    /// Kept so appends do not walk the sibling chain
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    pub(crate) fn detached(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Whether the node may hold children
    pub fn is_container(&self) -> bool {
        !matches!(self.data, NodeData::Text(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// What a host node holds
#[derive(Debug)]
pub enum NodeData {
    /// Arena root; parent of `<body>`
    Document,
    Element(ElementData),
    Text(String),
}

/// Element tag, class list and the remaining attributes
#[derive(Debug)]
pub struct ElementData {
    /// Lowercased on creation
    pub tag: String,
    pub classes: ClassList,
    /// `(name, value)` pairs other than `class`, in first-set order
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: ClassList::new(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v.as_str()))
    }

    /// Overwrite in place, or append a new pair
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some((_, v)) = self.attrs.iter_mut().find(|(n, _)| n == name) {
            *v = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }
}
