//! Expansion Engine
//!
//! Runs structural hooks over a subtree until no unexpanded node is left.
//! Work is pulled from an explicit stack of node ids, so hooks may rewrite
//! the very subtree being walked (append, empty, replace, implement,
//! remove) without invalidating the traversal.

use std::cell::OnceCell;
use std::rc::Rc;

use blok_dom::{HostTarget, NodeId as DomNodeId};

use crate::{
    ComposedDeclaration, Content, Context, Lifecycle, NodeDescriptor, NodeId, Result, Runtime,
    RuntimeError,
};

impl Runtime {
    /// Expand a node and everything below it
    ///
    /// A no-op for nodes past `Expanding`; children that are still
    /// unexpanded below an expanded node are picked up. Replaced nodes
    /// forward to their substitute.
    pub fn expand(&mut self, id: NodeId) -> Result<NodeId> {
        let id = self.tree.current(id);
        self.tree.node(id)?;
        self.with_lock(|rt| rt.expand_subtree(id))?;
        Ok(self.tree.current(id))
    }

    fn expand_subtree(&mut self, root: NodeId) -> Result<()> {
        let limit = self.config.max_expansion_depth;
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let node = self.tree.node(id)?;
            if node.state == Lifecycle::Unexpanded {
                if node.generation > limit {
                    let selector = self.tree.selector(id).to_string();
                    tracing::warn!(%selector, limit, "expansion depth exceeded");
                    return Err(RuntimeError::ExpansionDepthExceeded { selector, limit });
                }
                self.expand_one(id)?;
            }

            let node = self.tree.node(id)?;
            match (node.state, node.replaced_by) {
                (Lifecycle::Removed, Some(substitute)) => stack.push(substitute),
                (Lifecycle::Removed | Lifecycle::Failed, _) => {}
                _ => stack.extend(node.children.iter().rev().copied()),
            }
        }
        Ok(())
    }

    /// Run the structural hook chain of a single node
    fn expand_one(&mut self, id: NodeId) -> Result<()> {
        let behavior = match self.behavior(id) {
            Ok(b) => b,
            Err(e) => {
                self.tree.set_state(id, Lifecycle::Failed)?;
                return Err(e);
            }
        };
        self.tree.set_state(id, Lifecycle::Expanding)?;
        tracing::trace!(node = %id, selector = %self.tree.selector(id), "expand");

        if let Some(behavior) = behavior {
            let hooks = behavior.expand.clone();
            if let Err(e) = Context::run_hooks(self, id, hooks) {
                if self.tree.state(id) == Some(Lifecycle::Expanding) {
                    self.tree.set_state(id, Lifecycle::Failed)?;
                }
                return Err(e);
            }
        }

        // the hook may have removed or replaced its own node
        if self.tree.state(id) == Some(Lifecycle::Expanding) {
            self.tree.set_state(id, Lifecycle::Expanded)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// Guard for mutations on a node that has left the tree
    fn is_retired(&self, id: NodeId, op: &str) -> Result<bool> {
        let node = self.tree.node(id)?;
        if node.replaced_by.is_some() || node.state == Lifecycle::Removed {
            tracing::warn!(node = %id, op, "mutation on a replaced or removed node ignored");
            return Ok(true);
        }
        Ok(false)
    }

    /// Append a descriptor or text as the last child of `parent`
    ///
    /// Content appended to an expanded node is expanded at once; content
    /// appended to an attached node is also attached and initialized.
    pub fn append(&mut self, parent: NodeId, content: impl Into<Content>) -> Result<NodeId> {
        let content = content.into();
        let generation = self.generation_after(parent)?;
        let child = self.instantiate_content(&content, generation)?;
        if self.is_retired(parent, "append")? {
            return Ok(child);
        }
        self.tree.link(parent, child, None)?;
        self.after_insert(parent, child)?;
        Ok(self.tree.current(child))
    }

    /// Re-insert detached nodes at the end of `parent`'s content
    pub fn append_nodes(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<()> {
        if self.is_retired(parent, "append_nodes")? {
            return Ok(());
        }
        for &child in nodes {
            self.tree.link(parent, child, None)?;
            match (self.host_of(parent), self.host_of(child)) {
                (Some(parent_host), Some(child_host)) => {
                    self.host.borrow_mut().append_child(parent_host, child_host)?;
                    self.rebind(child)?;
                }
                _ => self.after_insert(parent, child)?,
            }
        }
        Ok(())
    }

    /// Detach and return the content of a node
    ///
    /// Host nodes of attached content are taken out of the document and
    /// every listener of the detached subtrees is released, window
    /// handlers included. The nodes keep their state and host nodes;
    /// [`Runtime::append_nodes`] under an attached parent binds their
    /// handlers again.
    pub fn empty(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        if self.is_retired(id, "empty")? {
            return Ok(Vec::new());
        }
        let children = self.children(id);
        for &child in &children {
            self.tree.unlink(child)?;
            self.unbind(child)?;
            if let Some(host) = self.host_of(child) {
                self.host.borrow_mut().remove_node(host)?;
            }
        }
        Ok(children)
    }

    /// Catch a freshly linked child up with its parent's lifecycle
    pub(crate) fn after_insert(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let Some(state) = self.tree.state(parent) else {
            return Err(RuntimeError::UnknownNode(parent));
        };
        match state {
            Lifecycle::Expanded => {
                self.expand(child)?;
            }
            s if s.is_attached() => {
                let child = self.expand(child)?;
                let Some(parent_host) = self.host_of(parent) else {
                    return Ok(());
                };
                self.materialize(child, parent_host, DomNodeId::NONE)?;
                self.initialize(child)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Substitute a node with a new subtree at the same position
    pub fn replace_with(&mut self, id: NodeId, desc: &NodeDescriptor) -> Result<NodeId> {
        self.substitute(id, desc, false)
    }

    /// Substitute a node, keeping its non-structural behavior
    ///
    /// The substitute takes the original's position, its event, window and
    /// modifier handlers, defaults, lifecycle hooks and methods, and its
    /// explicit modifiers and parameters where the descriptor sets none.
    /// The original's structural hook is not carried over.
    pub fn implement_with(&mut self, id: NodeId, desc: &NodeDescriptor) -> Result<NodeId> {
        self.substitute(id, desc, true)
    }

    fn substitute(&mut self, original: NodeId, desc: &NodeDescriptor, implement: bool) -> Result<NodeId> {
        if self.is_retired(original, "substitute")? {
            return Ok(self.tree.current(original));
        }
        let generation = self.generation_after(original)?;
        let replacement = self.instantiate(desc, generation)?;
        let original_behavior = if implement {
            Some(self.behavior(original)?)
        } else {
            None
        };
        let original_state = self.tree.node(original)?.state;
        let original_host = self.host_of(original);
        let host_parent = self.host_parent(original);

        self.tree.swap_in(original, replacement)?;
        if let Some(mount) = self.mounts.remove(&original) {
            self.mounts.insert(replacement, mount);
        }
        if let Some(i) = self.pending.iter().position(|p| *p == original) {
            self.pending[i] = replacement;
        }

        if let Some(original_behavior) = original_behavior {
            self.carry_state(original, replacement)?;
            let selector = self.tree.selector(replacement);
            let own = self.registry.lookup(&selector)?;
            let original_behavior = match original_behavior {
                Some(b) => b,
                None => Rc::new(ComposedDeclaration::empty(&self.tree.selector(original))),
            };
            let overlay =
                ComposedDeclaration::implemented_by(&original_behavior, &selector, own.as_deref());
            // the overlay replaces whatever the substitute resolved so far
            self.tree.node_mut(replacement)?.behavior = OnceCell::from(Some(Rc::new(overlay)));
        }

        self.tree.node_mut(original)?.replaced_by = Some(replacement);
        tracing::debug!(
            %original,
            %replacement,
            implement,
            selector = %self.tree.selector(replacement),
            "substituted node"
        );

        // discard the original with everything appended to it so far
        self.retire(original)?;
        if let Some(host) = original_host {
            let Some(host_parent) = host_parent else {
                self.host.borrow_mut().remove_node(host)?;
                return Ok(replacement);
            };
            let replacement = self.expand(replacement)?;
            self.materialize(replacement, host_parent, host)?;
            self.host.borrow_mut().remove_node(host)?;
            self.initialize(replacement)?;
            return Ok(replacement);
        }

        match original_state {
            // still being walked; the worklist forwards to the substitute
            Lifecycle::Unexpanded | Lifecycle::Expanding => Ok(replacement),
            _ => self.expand(replacement),
        }
    }

    /// Copy explicit modifiers, parameters and identifier the substitute
    /// does not set itself
    fn carry_state(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        let source = self.tree.node(from)?;
        let mods = source.mods.clone();
        let params = source.params.clone();
        let ident = source.id.clone();
        let target = self.tree.node_mut(to)?;
        for (k, v) in mods {
            target.mods.entry(k).or_insert(v);
        }
        for (k, v) in params {
            target.params.entry(k).or_insert(v);
        }
        if target.id.is_none() {
            target.id = ident;
        }
        Ok(())
    }

    /// Generation for content created next to `anchor`: one round deeper
    /// while a hook or handler is running
    fn generation_after(&self, anchor: NodeId) -> Result<usize> {
        let generation = self.tree.node(anchor)?.generation;
        Ok(if self.registry.is_locked() {
            generation + 1
        } else {
            generation
        })
    }

    /// Host node the given component's host node lives under
    pub(crate) fn host_parent(&self, id: NodeId) -> Option<DomNodeId> {
        match self.parent(id) {
            Some(parent) => self.host_of(parent),
            None => self.mounts.get(&id).copied(),
        }
    }

    /// Mark a subtree removed and drop its bindings; structure is untouched
    pub(crate) fn retire(&mut self, id: NodeId) -> Result<()> {
        self.unbind(id)?;
        for node in self.tree.preorder(id).into_iter().rev() {
            if let Some(host) = self.host_of(node) {
                self.host_index.remove(&host);
            }
            self.tree.set_state(node, Lifecycle::Removed)?;
        }
        self.pending.retain(|p| *p != id);
        Ok(())
    }

    /// Release every listener bound for a subtree
    pub(crate) fn unbind(&mut self, id: NodeId) -> Result<()> {
        for node in self.tree.preorder(id) {
            let keys = std::mem::take(&mut self.tree.node_mut(node)?.listeners);
            for key in keys {
                if let Some(binding) = self.bindings.remove(&key) {
                    self.host
                        .borrow_mut()
                        .remove_event_listener(binding.target, &binding.event, key);
                    tracing::trace!(node = %node, event = %binding.event, "unbound listener");
                }
            }
        }
        Ok(())
    }

    /// Window handlers currently bound for a node
    pub fn window_bindings(&self, id: NodeId) -> usize {
        self.bindings
            .values()
            .filter(|b| b.node == id && b.target == HostTarget::Window)
            .count()
    }
}
