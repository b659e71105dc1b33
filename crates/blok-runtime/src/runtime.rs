//! Runtime - owns the registry, the node tree and the host handle
//!
//! The other components are `impl Runtime` blocks in their own modules:
//! expansion ([`crate::expand`]), modifiers ([`crate::modifiers`]),
//! lifecycle and events ([`crate::dispatch`]) and document projection
//! ([`crate::projection`]).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use blok_dom::{Document, HostDocument, HostTarget, ListenerKey};

use crate::selector::{class_name, ELEMENT_SEPARATOR};
use crate::{
    ComposedDeclaration, Declaration, Lifecycle, Node, NodeDescriptor, NodeId, NodeTree, Registry,
    Result, RuntimeConfig, RuntimeError, Selector,
};

/// Host handle shared between the runtime and its embedder
pub type SharedHost = Rc<RefCell<dyn HostDocument>>;

/// What a bound listener key stands for
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub node: NodeId,
    pub target: HostTarget,
    pub event: String,
}

/// Component runtime
pub struct Runtime {
    pub(crate) registry: Registry,
    pub(crate) tree: NodeTree,
    pub(crate) host: SharedHost,
    pub(crate) config: RuntimeConfig,
    pub(crate) bindings: HashMap<ListenerKey, Binding>,
    next_listener: u64,
    /// Host node → component node, for event routing
    pub(crate) host_index: HashMap<crate::HostRef, NodeId>,
    /// Host parent each attached root was mounted into
    pub(crate) mounts: HashMap<NodeId, crate::HostRef>,
    /// Deferred attach requests, in request order
    pub(crate) pending: Vec<NodeId>,
}

impl Runtime {
    /// Create a runtime with the default configuration
    pub fn new(registry: Registry, host: SharedHost) -> Self {
        Self::with_config(registry, host, RuntimeConfig::default())
    }

    pub fn with_config(mut registry: Registry, host: SharedHost, config: RuntimeConfig) -> Self {
        registry.set_policy(config.registry_policy);
        tracing::info!(
            declarations = registry.len(),
            attach_mode = ?config.attach_mode,
            "blok runtime {} initialized",
            crate::VERSION
        );
        Self {
            registry,
            tree: NodeTree::new(),
            host,
            config,
            bindings: HashMap::new(),
            next_listener: 1,
            host_index: HashMap::new(),
            mounts: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Runtime over a fresh in-memory [`Document`]; the document handle is
    /// returned for inspection
    pub fn with_document(registry: Registry, config: RuntimeConfig) -> (Self, Rc<RefCell<Document>>) {
        let doc = Rc::new(RefCell::new(Document::new()));
        let runtime = Self::with_config(registry, doc.clone(), config);
        (runtime, doc)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn host(&self) -> SharedHost {
        self.host.clone()
    }

    /// Register a declaration (see [`Registry::register`])
    pub fn register(&mut self, decl: Declaration) -> Result<()> {
        self.registry.register(decl)
    }

    /// Run `f` with the registry locked against strict registration
    pub(crate) fn with_lock<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.registry.lock();
        let result = f(self);
        self.registry.unlock();
        result
    }

    pub(crate) fn next_listener_key(&mut self) -> ListenerKey {
        let key = ListenerKey(self.next_listener);
        self.next_listener += 1;
        key
    }

    // ------------------------------------------------------------------
    // Node access
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    pub fn state(&self, id: NodeId) -> Option<Lifecycle> {
        self.tree.state(id)
    }

    pub fn selector(&self, id: NodeId) -> Selector {
        self.tree.selector(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id).and_then(Node::parent)
    }

    /// Children in document order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Host node a component is projected to
    pub fn host_of(&self, id: NodeId) -> Option<crate::HostRef> {
        self.tree.get(id).and_then(Node::host)
    }

    /// Root trees in creation order
    pub fn roots(&self) -> &[NodeId] {
        self.tree.roots()
    }

    /// Node currently standing where `id` stood (after replacements)
    pub fn current(&self, id: NodeId) -> NodeId {
        self.tree.current(id)
    }

    /// Composed behavior of a node (`None` for undeclared selectors)
    ///
    /// Resolved through the registry on first use and kept on the node.
    pub fn behavior(&self, id: NodeId) -> Result<Option<Rc<ComposedDeclaration>>> {
        let node = self.tree.node(id)?;
        if let Some(cached) = node.behavior.get() {
            return Ok(cached.clone());
        }
        let resolved = self.registry.lookup(&self.tree.selector(id))?;
        let _ = node.behavior.set(resolved.clone());
        Ok(resolved)
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Instantiate a descriptor tree as a new, unexpanded root
    pub fn build(&mut self, desc: &NodeDescriptor) -> Result<NodeId> {
        let id = self.instantiate(desc, 0)?;
        self.tree.add_root(id);
        tracing::debug!(node = %id, name = %desc.name, "built root");
        Ok(id)
    }

    /// Create a detached subtree from a descriptor, every node tagged with
    /// `generation`
    pub(crate) fn instantiate(&mut self, desc: &NodeDescriptor, generation: usize) -> Result<NodeId> {
        if desc.name.is_empty() {
            return Err(RuntimeError::InvalidDescriptor("node name is empty".into()));
        }
        let split = desc.split_attributes()?;
        let mut node = Node::component(&desc.name);
        node.params = split.params;
        node.mods = split.mods;
        node.id = split.id;
        node.generation = generation;
        let id = self.tree.insert(node);

        for child in &desc.children {
            let child_id = self.instantiate_content(child, generation)?;
            self.tree.link(id, child_id, None)?;
        }
        Ok(id)
    }

    pub(crate) fn instantiate_content(
        &mut self,
        content: &crate::Content,
        generation: usize,
    ) -> Result<NodeId> {
        match content {
            crate::Content::Text(text) => Ok(self.tree.insert(Node::text_run(text))),
            crate::Content::Node(desc) => self.instantiate(desc, generation),
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// All live nodes, roots first then document order
    fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .roots()
            .iter()
            .flat_map(|root| self.tree.preorder(*root))
            .filter(|id| self.tree.state(*id).is_some_and(Lifecycle::is_live))
    }

    /// Does the node answer to `selector`, directly or through a role it
    /// took over via `implement_with`
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        if self.tree.selector(id) == *selector {
            return true;
        }
        self.tree
            .get(id)
            .and_then(|n| n.behavior.get())
            .and_then(Option::as_ref)
            .is_some_and(|b| b.roles().contains(selector))
    }

    /// Every live node with the given selector, in document order
    pub fn find(&self, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        self.live_nodes()
            .filter(|id| self.matches(*id, &selector))
            .collect()
    }

    /// Node carrying the assigned identifier
    pub fn find_by_id(&self, ident: &str) -> Option<NodeId> {
        self.live_nodes()
            .find(|id| self.tree.get(*id).and_then(Node::id) == Some(ident))
    }

    /// Path-relative child lookup
    ///
    /// `path` is a `/`-separated list of child names (`tab/title`). Each
    /// segment matches direct children by element name, block name or full
    /// selector; the result holds every match of the last segment in
    /// document order and is empty when nothing matches.
    pub fn get(&self, id: NodeId, path: &str) -> Vec<NodeId> {
        let mut current = vec![id];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .iter()
                .flat_map(|parent| self.children(*parent))
                .filter(|child| self.child_matches(*child, segment))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        if current == [id] {
            return Vec::new();
        }
        current
    }

    fn child_matches(&self, child: NodeId, segment: &str) -> bool {
        let Some(node) = self.tree.get(child) else {
            return false;
        };
        if node.is_text() || !node.state.is_live() {
            return false;
        }
        if segment.contains(ELEMENT_SEPARATOR) {
            return self.matches(child, &Selector::parse(segment));
        }
        let selector = self.tree.selector(child);
        match selector.element_part() {
            Some(element) => element == class_name(segment),
            None => selector == Selector::block(segment),
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("registry", &self.registry)
            .field("nodes", &self.tree.len())
            .field("roots", &self.tree.roots())
            .field("bindings", &self.bindings.len())
            .field("pending", &self.pending)
            .field("config", &self.config)
            .finish()
    }
}
