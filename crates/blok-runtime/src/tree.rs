//! Node Tree (arena-based allocation)
//!
//! Owns structure only: parent links, ordered children and the list of
//! root trees. Removed nodes stay in the arena as tombstones so stale
//! [`NodeId`]s never alias a different node.

use crate::{Lifecycle, Node, NodeId, NodeKind, Result, RuntimeError, Selector};

/// Arena of component nodes
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(RuntimeError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(RuntimeError::UnknownNode(id))
    }

    /// Number of nodes ever created (including tombstones)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root trees in creation order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn add_root(&mut self, id: NodeId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    /// Insert `child` under `parent` at `index` (append when `None`)
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(RuntimeError::HierarchyRequest { parent, child });
        }
        self.node(parent)?;
        self.unlink(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        match index {
            Some(i) if i <= siblings.len() => siblings.insert(i, child),
            _ => siblings.push(child),
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach a node from its parent or from the root list
    pub(crate) fn unlink(&mut self, id: NodeId) -> Result<()> {
        match self.node(id)?.parent {
            Some(parent) => {
                self.node_mut(parent)?.children.retain(|c| *c != id);
                self.node_mut(id)?.parent = None;
            }
            None => self.roots.retain(|r| *r != id),
        }
        Ok(())
    }

    /// Put `replacement` where `original` sits (same parent and index, or
    /// same root slot) and detach `original`
    pub(crate) fn swap_in(&mut self, original: NodeId, replacement: NodeId) -> Result<()> {
        self.unlink(replacement)?;
        match self.node(original)?.parent {
            Some(parent) => {
                let siblings = &mut self.node_mut(parent)?.children;
                if let Some(slot) = siblings.iter_mut().find(|c| **c == original) {
                    *slot = replacement;
                }
                self.node_mut(replacement)?.parent = Some(parent);
                self.node_mut(original)?.parent = None;
            }
            None => {
                if let Some(i) = self.roots.iter().position(|r| *r == original) {
                    self.roots[i] = replacement;
                }
            }
        }
        Ok(())
    }

    /// Follow `replaced_by` links to the node currently standing in
    pub fn current(&self, mut id: NodeId) -> NodeId {
        while let Some(next) = self.get(id).and_then(|n| n.replaced_by) {
            id = next;
        }
        id
    }

    /// Index of a node among its parent's children
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self.get(parent)?.children.iter().position(|c| *c == id)
    }

    /// Subtree in pre-order (document order), the node itself first
    pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.get(id).and_then(|n| n.parent);
        while let Some(p) = current {
            out.push(p);
            current = self.get(p).and_then(|n| n.parent);
        }
        out
    }

    /// Selector of a node
    ///
    /// Blocks and `Block__element` names know their selector from
    /// creation. Plain elements take the block part of their nearest
    /// ancestor with a known selector; the result is cached once found.
    /// A detached element with no such ancestor reads as its bare name.
    pub fn selector(&self, id: NodeId) -> Selector {
        let Some(node) = self.get(id) else {
            return Selector::default();
        };
        if let Some(selector) = node.selector.get() {
            return selector.clone();
        }
        if node.is_text() {
            return Selector::default();
        }
        for ancestor in self.ancestors(id) {
            let Some(a) = self.get(ancestor) else {
                continue;
            };
            if let Some(owner) = a.selector.get() {
                let selector = Selector::element(owner, &node.name);
                let _ = node.selector.set(selector.clone());
                return selector;
            }
        }
        Selector::parse(&node.name)
    }

    /// Nearest ancestor block (the owning block of an element)
    pub fn owning_block(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.get(*a).is_some_and(|n| n.kind == NodeKind::Block))
    }

    pub(crate) fn set_state(&mut self, id: NodeId, state: Lifecycle) -> Result<()> {
        self.node_mut(id)?.state = state;
        Ok(())
    }

    pub fn state(&self, id: NodeId) -> Option<Lifecycle> {
        self.get(id).map(|n| n.state)
    }
}
