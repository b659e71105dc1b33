//! Event & Lifecycle Dispatcher
//!
//! Attach order for a subtree:
//!
//! 1. pre-order: post-attach hook, then bind document and window handlers
//!    (`Attached → Initialized`);
//! 2. reverse pre-order: post-subtree hook (`Initialized → Ready`), so a
//!    node's hook runs only once every descendant finished step 1.
//!
//! Removal unbinds every listener of the subtree, window listeners
//! included, before the host node is detached.

use blok_dom::{Event, HostTarget, NodeId as DomNodeId};
use serde_json::Value;

use crate::runtime::Binding;
use crate::{
    AttachMode, ComposedDeclaration, Context, HostRef, Lifecycle, NodeDescriptor, NodeId, Result, Runtime, RuntimeError,
};

impl Runtime {
    /// Attach a root tree under a host node
    ///
    /// Expands the tree first. In `Immediate` mode host nodes are created
    /// and lifecycle hooks run before this returns; in `Deferred` mode the
    /// request is queued until [`Runtime::flush`].
    pub fn attach(&mut self, root: NodeId, host_parent: HostRef) -> Result<NodeId> {
        let root = self.tree.current(root);
        if !self.tree.roots().contains(&root) {
            return Err(RuntimeError::NotARoot(root));
        }
        let root = self.expand(root)?;
        if self.tree.node(root)?.state.is_attached() {
            return Ok(root);
        }
        self.mounts.insert(root, host_parent);

        match self.config.attach_mode {
            AttachMode::Immediate => self.attach_now(root)?,
            AttachMode::Deferred => {
                tracing::trace!(root = %root, "attach deferred");
                if !self.pending.contains(&root) {
                    self.pending.push(root);
                }
            }
        }
        Ok(self.tree.current(root))
    }

    /// Build, expand and attach a descriptor tree in one step
    pub fn mount(&mut self, desc: &NodeDescriptor, host_parent: HostRef) -> Result<NodeId> {
        let root = self.build(desc)?;
        self.attach(root, host_parent)
    }

    /// Materialize queued attach requests in request order
    ///
    /// Requests for roots removed in the meantime are dropped.
    pub fn flush(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        for root in pending {
            let root = self.tree.current(root);
            let node = self.tree.node(root)?;
            if node.state != Lifecycle::Expanded {
                continue;
            }
            self.attach_now(root)?;
        }
        Ok(())
    }

    /// Number of queued attach requests
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn attach_now(&mut self, root: NodeId) -> Result<()> {
        let Some(host_parent) = self.mounts.get(&root).copied() else {
            return Ok(());
        };
        self.materialize(root, host_parent, DomNodeId::NONE)?;
        self.initialize(root)
    }

    /// Run post-attach and post-subtree hooks over a freshly attached subtree
    ///
    /// A failing hook marks its node `Failed` together with the part of its
    /// subtree that was not initialized yet; the rest of the tree still
    /// completes and the first error is returned afterwards.
    pub(crate) fn initialize(&mut self, root: NodeId) -> Result<()> {
        self.with_lock(|rt| {
            let mut first_error = None;
            for id in rt.tree.preorder(root) {
                if rt.tree.state(id) != Some(Lifecycle::Attached) {
                    continue;
                }
                if let Err(e) = rt.init_node(id) {
                    rt.fail_subtree(id);
                    first_error.get_or_insert(e);
                }
            }
            for id in rt.tree.preorder(root).into_iter().rev() {
                if rt.tree.state(id) != Some(Lifecycle::Initialized) {
                    continue;
                }
                if let Err(e) = rt.ready_node(id) {
                    first_error.get_or_insert(e);
                }
            }
            first_error.map_or(Ok(()), Err)
        })
    }

    fn init_node(&mut self, id: NodeId) -> Result<()> {
        let Some(behavior) = self.behavior(id)? else {
            return self.tree.set_state(id, Lifecycle::Initialized);
        };
        tracing::trace!(node = %id, selector = %self.tree.selector(id), "post-attach");

        if let Err(e) = Context::run_hooks(self, id, behavior.dom_init.clone()) {
            self.fail(id);
            return Err(e);
        }
        // the hook may have removed or replaced its node
        if self.tree.state(id) != Some(Lifecycle::Attached) {
            return Ok(());
        }

        if let Some(host) = self.host_of(id) {
            self.bind_handlers(id, host, &behavior);
        }
        self.tree.set_state(id, Lifecycle::Initialized)
    }

    fn bind_handlers(&mut self, id: NodeId, host: HostRef, behavior: &ComposedDeclaration) {
        for event in behavior.on.keys() {
            self.bind(id, HostTarget::Node(host), event);
        }
        for event in behavior.on_win.keys() {
            self.bind(id, HostTarget::Window, event);
        }
    }

    /// Bind handlers again for initialized nodes of a subtree put back into
    /// the document after [`Runtime::empty`]
    pub(crate) fn rebind(&mut self, root: NodeId) -> Result<()> {
        for id in self.tree.preorder(root) {
            let node = self.tree.node(id)?;
            let initialized = matches!(node.state, Lifecycle::Initialized | Lifecycle::Ready);
            if !initialized || !node.listeners.is_empty() {
                continue;
            }
            let (Some(host), Some(behavior)) = (node.host, self.behavior(id)?) else {
                continue;
            };
            self.bind_handlers(id, host, &behavior);
        }
        Ok(())
    }

    fn ready_node(&mut self, id: NodeId) -> Result<()> {
        if let Some(behavior) = self.behavior(id)? {
            tracing::trace!(node = %id, selector = %self.tree.selector(id), "post-subtree");
            if let Err(e) = Context::run_hooks(self, id, behavior.subtree_ready.clone()) {
                self.fail(id);
                return Err(e);
            }
        }
        if self.tree.state(id) == Some(Lifecycle::Initialized) {
            self.tree.set_state(id, Lifecycle::Ready)?;
        }
        Ok(())
    }

    /// Mark the not yet initialized part of a subtree whose root hook raised
    fn fail_subtree(&mut self, root: NodeId) {
        for id in self.tree.preorder(root).into_iter().skip(1) {
            if let Some(node) = self.tree.get_mut(id) {
                if node.state == Lifecycle::Attached {
                    node.state = Lifecycle::Failed;
                }
            }
        }
    }

    /// Mark a node whose hook raised, unless the hook already took it out
    fn fail(&mut self, id: NodeId) {
        if let Some(node) = self.tree.get_mut(id) {
            if node.state != Lifecycle::Removed {
                tracing::warn!(node = %id, state = ?node.state, "lifecycle hook failed");
                node.state = Lifecycle::Failed;
            }
        }
    }

    fn bind(&mut self, id: NodeId, target: HostTarget, event: &str) {
        let key = self.next_listener_key();
        self.host.borrow_mut().add_event_listener(target, event, key);
        self.bindings.insert(
            key,
            Binding {
                node: id,
                target,
                event: event.to_string(),
            },
        );
        if let Some(node) = self.tree.get_mut(id) {
            node.listeners.push(key);
        }
        tracing::trace!(node = %id, ?target, event, "bound listener");
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove a node and its subtree
    ///
    /// Every listener bound for the subtree is released and pending
    /// lifecycle hooks of the subtree never run. Removing twice is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let node = self.tree.node(id)?;
        if node.state == Lifecycle::Removed {
            return Ok(());
        }
        let host = node.host;
        tracing::debug!(node = %id, selector = %self.tree.selector(id), "remove");

        self.retire(id)?;
        if let Some(host) = host {
            self.host.borrow_mut().remove_node(host)?;
        }
        self.tree.unlink(id)?;
        self.mounts.remove(&id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Deliver a host event
    ///
    /// Node targets are resolved to their component and the event travels
    /// up through the component ancestors while it bubbles.
    pub fn dispatch_event(&mut self, target: HostTarget, event: &mut Event) -> Result<()> {
        match target {
            HostTarget::Window => self.dispatch_window_event(event),
            HostTarget::Node(host) => match self.host_index.get(&host).copied() {
                Some(node) => self.trigger(node, event),
                None => Ok(()),
            },
        }
    }

    /// Dispatch an event starting at a component
    pub fn trigger(&mut self, id: NodeId, event: &mut Event) -> Result<()> {
        let mut path = vec![id];
        path.extend(self.tree.ancestors(id));

        self.with_lock(|rt| {
            for node in path {
                let Some(host) = rt.host_of(node) else {
                    continue;
                };
                rt.deliver(HostTarget::Node(host), event)?;
                if !event.bubbles || event.is_propagation_stopped() {
                    break;
                }
            }
            Ok(())
        })
    }

    /// Deliver an event to every bound window handler
    pub fn dispatch_window_event(&mut self, event: &mut Event) -> Result<()> {
        self.with_lock(|rt| rt.deliver(HostTarget::Window, event))
    }

    /// Run the handlers bound on one target
    fn deliver(&mut self, target: HostTarget, event: &mut Event) -> Result<()> {
        let keys = self.host.borrow().listeners(target, &event.name);
        for key in keys {
            let Some(binding) = self.bindings.get(&key).cloned() else {
                continue;
            };
            if !self
                .tree
                .state(binding.node)
                .is_some_and(Lifecycle::is_attached)
            {
                continue;
            }
            let Some(behavior) = self.behavior(binding.node)? else {
                continue;
            };
            let table = match target {
                HostTarget::Window => &behavior.on_win,
                HostTarget::Node(_) => &behavior.on,
            };
            let Some(handler) = table.get(&event.name).cloned() else {
                continue;
            };
            tracing::trace!(node = %binding.node, event = %event.name, "dispatch");
            let mut cx = Context::new(self, binding.node);
            handler(&mut cx, event)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Methods
    // ------------------------------------------------------------------

    /// Call a user-defined method on a node
    pub fn call(&mut self, id: NodeId, method: &str, args: &[Value]) -> Result<Value> {
        let slots = self
            .behavior(id)?
            .and_then(|behavior| behavior.methods.get(method).cloned());
        let Some(slots) = slots else {
            return Err(RuntimeError::UnknownMethod {
                selector: self.tree.selector(id).to_string(),
                method: method.to_string(),
            });
        };
        self.with_lock(|rt| Context::run_method(rt, id, method, slots, args))
    }
}
