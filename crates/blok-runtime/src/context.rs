//! Hook invocation context
//!
//! Every hook, handler and method receives a [`Context`]: the subject node
//! plus mutable access to the runtime. Chained hooks and methods also carry
//! a cursor into their precedence chain, advanced by
//! [`Context::inherited`] / [`Context::inherited_call`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::declaration::MethodSlot;
use crate::registry::{HookChain, MethodChain};
use crate::{
    Content, Event, HostRef, ModValue, NodeDescriptor, NodeId, Result, Runtime, RuntimeError,
    Selector,
};

/// Position in the chain the current hook was taken from
enum Chain {
    Hooks {
        hooks: HookChain,
        next: usize,
    },
    Method {
        name: String,
        slots: MethodChain,
        next: usize,
    },
}

/// Subject node plus runtime access for user hooks
pub struct Context<'a> {
    rt: &'a mut Runtime,
    node: NodeId,
    chain: Option<Chain>,
}

impl<'a> Context<'a> {
    /// Context for a plain handler (no precedence chain)
    pub(crate) fn new(rt: &'a mut Runtime, node: NodeId) -> Self {
        Self {
            rt,
            node,
            chain: None,
        }
    }

    /// Run the head of a hook chain; a no-op for an empty chain
    pub(crate) fn run_hooks(rt: &'a mut Runtime, node: NodeId, hooks: HookChain) -> Result<()> {
        let Some(head) = hooks.first().cloned() else {
            return Ok(());
        };
        let mut cx = Self {
            rt,
            node,
            chain: Some(Chain::Hooks { hooks, next: 1 }),
        };
        head(&mut cx)
    }

    /// Run the head of a method chain
    pub(crate) fn run_method(
        rt: &'a mut Runtime,
        node: NodeId,
        name: &str,
        slots: MethodChain,
        args: &[Value],
    ) -> Result<Value> {
        let head = slots.first().cloned();
        let mut cx = Self {
            rt,
            node,
            chain: Some(Chain::Method {
                name: name.to_string(),
                slots,
                next: 1,
            }),
        };
        match head {
            Some(MethodSlot::Impl(method)) => method(&mut cx, args),
            Some(MethodSlot::Abstract) => Err(cx.abstract_method(name)),
            None => Ok(Value::Null),
        }
    }

    fn abstract_method(&self, name: &str) -> RuntimeError {
        RuntimeError::AbstractMethod {
            selector: self.rt.selector(self.node).to_string(),
            method: name.to_string(),
        }
    }

    /// Invoke the next hook in precedence order
    ///
    /// Returns `Ok(())` without doing anything once the chain is exhausted.
    pub fn inherited(&mut self) -> Result<()> {
        let hook = match &mut self.chain {
            Some(Chain::Hooks { hooks, next }) => {
                let hook = hooks.get(*next).cloned();
                *next = (*next + 1).min(hooks.len());
                hook
            }
            _ => return Err(RuntimeError::InvalidContext),
        };
        match hook {
            Some(hook) => hook(self),
            None => Ok(()),
        }
    }

    /// Invoke the next implementation of the current method
    ///
    /// Returns `Value::Null` once the chain is exhausted.
    pub fn inherited_call(&mut self, args: &[Value]) -> Result<Value> {
        let (name, slot) = match &mut self.chain {
            Some(Chain::Method { name, slots, next }) => {
                let slot = slots.get(*next).cloned();
                *next = (*next + 1).min(slots.len());
                (name.clone(), slot)
            }
            _ => return Err(RuntimeError::InvalidContext),
        };
        match slot {
            Some(MethodSlot::Impl(method)) => method(self, args),
            Some(MethodSlot::Abstract) => Err(self.abstract_method(&name)),
            None => Ok(Value::Null),
        }
    }

    /// Subject node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn runtime(&self) -> &Runtime {
        self.rt
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        self.rt
    }

    pub fn selector(&self) -> Selector {
        self.rt.selector(self.node)
    }

    pub fn host(&self) -> Option<HostRef> {
        self.rt.host_of(self.node)
    }

    /// Whether the subject has been substituted by `replace_with` or
    /// `implement_with`
    pub fn is_replaced(&self) -> bool {
        self.rt
            .node(self.node)
            .is_some_and(|n| n.replaced_by().is_some())
    }

    // ------------------------------------------------------------------
    // Parameters and modifiers
    // ------------------------------------------------------------------

    pub fn param(&self, name: &str) -> Option<Value> {
        self.rt.param(self.node, name)
    }

    pub fn get_mod(&self, name: &str) -> Option<ModValue> {
        self.rt.get_mod(self.node, name)
    }

    /// Whether a modifier reads as `true` or a non-empty string
    pub fn has_mod(&self, name: &str) -> bool {
        self.get_mod(name).is_some_and(|m| m.is_set())
    }

    pub fn set_mod(&mut self, name: &str, value: impl Into<ModValue>) -> Result<()> {
        self.rt.set_mod(self.node, name, value)
    }

    pub fn toggle_mod(
        &mut self,
        name: &str,
        on: impl Into<ModValue>,
        off: impl Into<ModValue>,
    ) -> Result<()> {
        self.rt.toggle_mod(self.node, name, on, off)
    }

    pub fn mods(&self) -> BTreeMap<String, ModValue> {
        self.rt.mods(self.node)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn children(&self) -> Vec<NodeId> {
        self.rt.children(self.node)
    }

    /// Append a descriptor or text to the subject
    pub fn append(&mut self, content: impl Into<Content>) -> Result<NodeId> {
        self.rt.append(self.node, content)
    }

    /// Re-insert detached nodes at the end of the subject's content
    pub fn append_nodes(&mut self, nodes: &[NodeId]) -> Result<()> {
        self.rt.append_nodes(self.node, nodes)
    }

    /// Detach and return the subject's content
    pub fn empty(&mut self) -> Result<Vec<NodeId>> {
        self.rt.empty(self.node)
    }

    pub fn replace_with(&mut self, desc: &NodeDescriptor) -> Result<NodeId> {
        self.rt.replace_with(self.node, desc)
    }

    pub fn implement_with(&mut self, desc: &NodeDescriptor) -> Result<NodeId> {
        self.rt.implement_with(self.node, desc)
    }

    pub fn remove(&mut self) -> Result<()> {
        self.rt.remove(self.node)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Path-relative lookup below the subject
    pub fn get(&self, path: &str) -> Vec<NodeId> {
        self.rt.get(self.node, path)
    }

    pub fn find(&self, selector: &str) -> Vec<NodeId> {
        self.rt.find(selector)
    }

    pub fn find_by_id(&self, ident: &str) -> Option<NodeId> {
        self.rt.find_by_id(ident)
    }

    // ------------------------------------------------------------------
    // Document and events
    // ------------------------------------------------------------------

    pub fn set_dom_attr(&mut self, name: &str, value: &str) -> Result<()> {
        self.rt.set_dom_attr(self.node, name, value)
    }

    /// Dispatch a bubbling custom event from the subject
    pub fn trigger(&mut self, event: &str) -> Result<()> {
        let mut event = Event::new(event);
        self.rt.trigger(self.node, &mut event)
    }

    /// Call a method on the subject
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        self.rt.call(self.node, method, args)
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chain = match &self.chain {
            Some(Chain::Hooks { hooks, next }) => format!("hooks {next}/{}", hooks.len()),
            Some(Chain::Method { name, slots, next }) => {
                format!("method {name} {next}/{}", slots.len())
            }
            None => "none".to_string(),
        };
        f.debug_struct("Context")
            .field("node", &self.node)
            .field("chain", &chain)
            .finish()
    }
}
