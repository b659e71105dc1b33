//! Declaration Registry
//!
//! Stores raw declarations by selector and resolves each one into a
//! memoised [`ComposedDeclaration`]:
//!
//! - the precedence order (linearization) is a depth-first, left-to-right
//!   walk of `inherits` edges keeping the first appearance of every
//!   ancestor, own declaration first;
//! - tables (defaults, handlers, document attributes) are unioned, entries
//!   closer to the front winning;
//! - hooks and methods are kept as chains in precedence order; only the
//!   head runs unless it calls `inherited`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use serde_json::Value;

use crate::declaration::{EventHandler, Hook, MethodSlot, ModHandler};
use crate::{Declaration, ModValue, RegistryPolicy, Result, RuntimeError, Selector};

/// Hooks of one phase in precedence order
pub type HookChain = Rc<[Hook]>;

/// Method slots in precedence order
pub type MethodChain = Rc<[MethodSlot]>;

/// Fully merged, linearized behavior record
#[derive(Clone)]
pub struct ComposedDeclaration {
    pub(crate) selector: Selector,
    pub(crate) lineage: Vec<Selector>,
    /// Selectors whose role this composition carries (implement overlays)
    pub(crate) roles: Vec<Selector>,
    pub(crate) expand: HookChain,
    pub(crate) dom_init: HookChain,
    pub(crate) subtree_ready: HookChain,
    pub(crate) default_mods: BTreeMap<String, ModValue>,
    pub(crate) default_params: BTreeMap<String, Value>,
    pub(crate) tag: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) dom_attrs: BTreeMap<String, String>,
    pub(crate) on: BTreeMap<String, EventHandler>,
    pub(crate) on_win: BTreeMap<String, EventHandler>,
    pub(crate) on_mod: BTreeMap<String, ModHandler>,
    pub(crate) methods: BTreeMap<String, MethodChain>,
}

impl ComposedDeclaration {
    /// Compose declarations given in precedence order (most specific first)
    fn compose(selector: &Selector, chain: &[&Declaration]) -> Self {
        let mut expand = Vec::new();
        let mut dom_init = Vec::new();
        let mut subtree_ready = Vec::new();
        let mut methods: BTreeMap<String, Vec<MethodSlot>> = BTreeMap::new();
        let mut composed = Self::empty(selector);

        for decl in chain {
            composed.lineage.push(decl.selector.clone());
            expand.extend(decl.expand.clone());
            dom_init.extend(decl.dom_init.clone());
            subtree_ready.extend(decl.subtree_ready.clone());
            if composed.tag.is_none() {
                composed.tag = decl.tag.clone();
            }
            for class in &decl.classes {
                if !composed.classes.contains(class) {
                    composed.classes.push(class.clone());
                }
            }
            union(&mut composed.default_mods, &decl.default_mods);
            union(&mut composed.default_params, &decl.default_params);
            union(&mut composed.dom_attrs, &decl.dom_attrs);
            union(&mut composed.on, &decl.on);
            union(&mut composed.on_win, &decl.on_win);
            union(&mut composed.on_mod, &decl.on_mod);
            for (name, slot) in &decl.methods {
                methods.entry(name.clone()).or_default().push(slot.clone());
            }
        }

        composed.expand = expand.into();
        composed.dom_init = dom_init.into();
        composed.subtree_ready = subtree_ready.into();
        composed.methods = methods.into_iter().map(|(k, v)| (k, v.into())).collect();
        composed
    }

    pub(crate) fn empty(selector: &Selector) -> Self {
        Self {
            selector: selector.clone(),
            lineage: Vec::new(),
            roles: Vec::new(),
            expand: Rc::from(Vec::new()),
            dom_init: Rc::from(Vec::new()),
            subtree_ready: Rc::from(Vec::new()),
            default_mods: BTreeMap::new(),
            default_params: BTreeMap::new(),
            tag: None,
            classes: Vec::new(),
            dom_attrs: BTreeMap::new(),
            on: BTreeMap::new(),
            on_win: BTreeMap::new(),
            on_mod: BTreeMap::new(),
            methods: BTreeMap::new(),
        }
    }

    /// Per-instance composition for a node substituted via `implement_with`
    ///
    /// The original's non-structural behavior (handlers, defaults, lifecycle
    /// hooks, methods) is laid over the substitute's own composition; the
    /// original's structural hook is dropped. Document derivation (tag,
    /// classes, attributes) stays the substitute's.
    pub(crate) fn implemented_by(
        original: &ComposedDeclaration,
        selector: &Selector,
        substitute: Option<&ComposedDeclaration>,
    ) -> Self {
        let base = match substitute {
            Some(s) => s.clone(),
            None => {
                let mut empty = Self::empty(selector);
                empty.lineage.push(selector.clone());
                empty
            }
        };

        let mut roles = original.roles.clone();
        roles.push(original.selector.clone());
        roles.extend(base.roles.iter().cloned());

        let mut composed = Self {
            roles,
            dom_init: concat(&original.dom_init, &base.dom_init),
            subtree_ready: concat(&original.subtree_ready, &base.subtree_ready),
            default_mods: original.default_mods.clone(),
            default_params: original.default_params.clone(),
            on: original.on.clone(),
            on_win: original.on_win.clone(),
            on_mod: original.on_mod.clone(),
            methods: original.methods.clone(),
            ..base.clone()
        };
        union(&mut composed.default_mods, &base.default_mods);
        union(&mut composed.default_params, &base.default_params);
        union(&mut composed.on, &base.on);
        union(&mut composed.on_win, &base.on_win);
        union(&mut composed.on_mod, &base.on_mod);
        for (name, slots) in &base.methods {
            let merged = match composed.methods.get(name) {
                Some(front) => concat(front, slots),
                None => slots.clone(),
            };
            composed.methods.insert(name.clone(), merged);
        }
        composed
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Precedence order, own declaration first
    pub fn lineage(&self) -> &[Selector] {
        &self.lineage
    }

    /// Original selectors this composition stands in for
    pub fn roles(&self) -> &[Selector] {
        &self.roles
    }

    pub fn default_mod(&self, name: &str) -> Option<&ModValue> {
        self.default_mods.get(&crate::selector::mod_key(name))
    }

    pub fn default_param(&self, name: &str) -> Option<&Value> {
        self.default_params.get(name)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn handles_event(&self, event: &str) -> bool {
        self.on.contains_key(event)
    }

    pub fn handles_window_event(&self, event: &str) -> bool {
        self.on_win.contains_key(event)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Number of structural hooks in the chain
    pub fn expand_chain_len(&self) -> usize {
        self.expand.len()
    }
}

impl std::fmt::Debug for ComposedDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedDeclaration")
            .field("selector", &self.selector)
            .field("lineage", &self.lineage)
            .field("roles", &self.roles)
            .field("expand", &self.expand.len())
            .field("dom_init", &self.dom_init.len())
            .field("subtree_ready", &self.subtree_ready.len())
            .field("default_mods", &self.default_mods)
            .field("tag", &self.tag)
            .field("on", &self.on.keys().collect::<Vec<_>>())
            .field("on_win", &self.on_win.keys().collect::<Vec<_>>())
            .field("on_mod", &self.on_mod.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Insert entries of `from` that `into` does not have yet
fn union<V: Clone>(into: &mut BTreeMap<String, V>, from: &BTreeMap<String, V>) {
    for (key, value) in from {
        into.entry(key.clone()).or_insert_with(|| value.clone());
    }
}

fn concat<T: Clone>(front: &Rc<[T]>, back: &Rc<[T]>) -> Rc<[T]> {
    front.iter().chain(back.iter()).cloned().collect()
}

/// Declaration registry
#[derive(Debug, Default)]
pub struct Registry {
    declarations: HashMap<Selector, Declaration>,
    resolved: RefCell<HashMap<Selector, Rc<ComposedDeclaration>>>,
    policy: RegistryPolicy,
    lock_depth: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RegistryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> RegistryPolicy {
        self.policy
    }

    pub(crate) fn set_policy(&mut self, policy: RegistryPolicy) {
        self.policy = policy;
    }

    /// Store a raw declaration
    ///
    /// Fails with `Conflict` when the selector is taken and the declaration
    /// is not marked as an override, and with `RegistryLocked` under the
    /// strict policy while an expansion/attach/dispatch pass is running.
    pub fn register(&mut self, decl: Declaration) -> Result<()> {
        let selector = decl.selector.clone();
        if self.is_locked() {
            match self.policy {
                RegistryPolicy::Strict => {
                    return Err(RuntimeError::RegistryLocked(selector.to_string()));
                }
                RegistryPolicy::Permissive => {
                    tracing::warn!(%selector, "declaration registered during an active pass");
                }
            }
        }
        if self.declarations.contains_key(&selector) && !decl.is_override {
            return Err(RuntimeError::Conflict(selector.to_string()));
        }

        tracing::debug!(%selector, inherits = ?decl.inherits, "register declaration");
        self.declarations.insert(selector, decl);
        // any cached composition may include the replaced entry
        self.resolved.borrow_mut().clear();
        Ok(())
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.declarations.contains_key(&Selector::parse(selector))
    }

    /// Raw declaration for a selector
    pub fn get(&self, selector: &str) -> Option<&Declaration> {
        self.declarations.get(&Selector::parse(selector))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declared selectors, sorted
    pub fn selectors(&self) -> Vec<Selector> {
        let mut all: Vec<_> = self.declarations.keys().cloned().collect();
        all.sort();
        all
    }

    /// Fully composed, memoised record for a selector
    pub fn resolve(&self, selector: &str) -> Result<Rc<ComposedDeclaration>> {
        self.resolve_selector(&Selector::parse(selector))
    }

    pub(crate) fn resolve_selector(&self, selector: &Selector) -> Result<Rc<ComposedDeclaration>> {
        if let Some(hit) = self.resolved.borrow().get(selector) {
            return Ok(hit.clone());
        }

        let lineage = self.linearize(selector)?;
        let chain: Vec<&Declaration> = lineage
            .iter()
            .filter_map(|s| self.declarations.get(s))
            .collect();
        let composed = Rc::new(ComposedDeclaration::compose(selector, &chain));
        tracing::debug!(%selector, lineage = ?lineage, "resolved declaration");

        self.resolved
            .borrow_mut()
            .insert(selector.clone(), composed.clone());
        Ok(composed)
    }

    /// Like `resolve`, but an undeclared selector yields `None`
    pub(crate) fn lookup(&self, selector: &Selector) -> Result<Option<Rc<ComposedDeclaration>>> {
        if !self.declarations.contains_key(selector) {
            return Ok(None);
        }
        self.resolve_selector(selector).map(Some)
    }

    /// Precedence order for a selector
    pub fn linearize(&self, selector: &Selector) -> Result<Vec<Selector>> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut path = Vec::new();
        self.visit(selector, &mut path, &mut seen, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        selector: &Selector,
        path: &mut Vec<Selector>,
        seen: &mut HashSet<Selector>,
        order: &mut Vec<Selector>,
    ) -> Result<()> {
        if let Some(start) = path.iter().position(|s| s == selector) {
            let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
            cycle.push(selector.to_string());
            return Err(RuntimeError::CyclicInheritance(cycle));
        }
        if !seen.insert(selector.clone()) {
            return Ok(());
        }
        let decl = self
            .declarations
            .get(selector)
            .ok_or_else(|| RuntimeError::UnknownSelector(selector.to_string()))?;
        order.push(selector.clone());

        path.push(selector.clone());
        for parent in &decl.inherits {
            self.visit(parent, path, seen, order)?;
        }
        path.pop();
        Ok(())
    }

    pub(crate) fn lock(&mut self) {
        self.lock_depth += 1;
    }

    pub(crate) fn unlock(&mut self) {
        self.lock_depth = self.lock_depth.saturating_sub(1);
    }

    pub fn is_locked(&self) -> bool {
        self.lock_depth > 0
    }
}
