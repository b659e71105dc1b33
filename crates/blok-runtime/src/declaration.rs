//! Declarations
//!
//! A declaration is the raw, uncomposed behavior record written for one
//! selector. The registry composes declarations along their `inherits`
//! edges into a [`ComposedDeclaration`](crate::ComposedDeclaration).

use std::collections::BTreeMap;
use std::rc::Rc;

use blok_dom::Event;
use serde_json::Value;

use crate::selector::mod_key;
use crate::{Context, ModValue, Result, Selector};

/// Lifecycle/structural hook; the subject node is `cx.node()`
pub type Hook = Rc<dyn Fn(&mut Context<'_>) -> Result<()>>;

/// Document or window event handler
pub type EventHandler = Rc<dyn Fn(&mut Context<'_>, &mut Event) -> Result<()>>;

/// Modifier change handler, called with `(new, previous)`
pub type ModHandler = Rc<dyn Fn(&mut Context<'_>, &ModValue, Option<&ModValue>) -> Result<()>>;

/// User-defined method
pub type Method = Rc<dyn Fn(&mut Context<'_>, &[Value]) -> Result<Value>>;

/// One entry of a method's precedence chain
#[derive(Clone)]
pub enum MethodSlot {
    Impl(Method),
    /// Must be overridden closer to the front of the chain
    Abstract,
}

/// Raw behavior record for one selector
#[derive(Clone, Default)]
pub struct Declaration {
    pub(crate) selector: Selector,
    pub(crate) inherits: Vec<Selector>,
    pub(crate) is_override: bool,
    pub(crate) expand: Option<Hook>,
    pub(crate) dom_init: Option<Hook>,
    pub(crate) subtree_ready: Option<Hook>,
    pub(crate) default_mods: BTreeMap<String, ModValue>,
    pub(crate) default_params: BTreeMap<String, Value>,
    pub(crate) tag: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) dom_attrs: BTreeMap<String, String>,
    pub(crate) on: BTreeMap<String, EventHandler>,
    pub(crate) on_win: BTreeMap<String, EventHandler>,
    pub(crate) on_mod: BTreeMap<String, ModHandler>,
    pub(crate) methods: BTreeMap<String, MethodSlot>,
}

impl Declaration {
    /// Start a declaration for `selector` (`Tabs`, `tabs`, `Tabs__tab`, ...)
    pub fn new(selector: &str) -> Self {
        Self {
            selector: Selector::parse(selector),
            ..Self::default()
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Parents in priority order (leftmost wins)
    pub fn inherits<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inherits
            .extend(parents.into_iter().map(|p| Selector::parse(p.as_ref())));
        self
    }

    /// Allow this declaration to replace an existing one
    pub fn override_existing(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// Structural rewrite hook
    pub fn expand(mut self, hook: impl Fn(&mut Context<'_>) -> Result<()> + 'static) -> Self {
        self.expand = Some(Rc::new(hook));
        self
    }

    /// Post-attach hook
    pub fn dom_init(mut self, hook: impl Fn(&mut Context<'_>) -> Result<()> + 'static) -> Self {
        self.dom_init = Some(Rc::new(hook));
        self
    }

    /// Post-subtree-attach hook
    pub fn subtree_ready(mut self, hook: impl Fn(&mut Context<'_>) -> Result<()> + 'static) -> Self {
        self.subtree_ready = Some(Rc::new(hook));
        self
    }

    pub fn default_mod(mut self, name: &str, value: impl Into<ModValue>) -> Self {
        self.default_mods.insert(mod_key(name), value.into());
        self
    }

    pub fn default_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.default_params.insert(name.to_string(), value.into());
        self
    }

    /// Host tag override
    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    /// Extra document class
    pub fn class(mut self, class: &str) -> Self {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
        self
    }

    /// Default document attribute
    pub fn dom_attr(mut self, name: &str, value: &str) -> Self {
        self.dom_attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Document event handler, bound on the node's host element
    pub fn on(
        mut self,
        event: &str,
        handler: impl Fn(&mut Context<'_>, &mut Event) -> Result<()> + 'static,
    ) -> Self {
        self.on.insert(event.to_string(), Rc::new(handler));
        self
    }

    /// Window event handler
    pub fn on_win(
        mut self,
        event: &str,
        handler: impl Fn(&mut Context<'_>, &mut Event) -> Result<()> + 'static,
    ) -> Self {
        self.on_win.insert(event.to_string(), Rc::new(handler));
        self
    }

    /// Modifier change handler
    pub fn on_mod(
        mut self,
        name: &str,
        handler: impl Fn(&mut Context<'_>, &ModValue, Option<&ModValue>) -> Result<()> + 'static,
    ) -> Self {
        self.on_mod.insert(mod_key(name), Rc::new(handler));
        self
    }

    pub fn method(
        mut self,
        name: &str,
        method: impl Fn(&mut Context<'_>, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        self.methods
            .insert(name.to_string(), MethodSlot::Impl(Rc::new(method)));
        self
    }

    /// Declare a method that descendants must implement
    pub fn abstract_method(mut self, name: &str) -> Self {
        self.methods.insert(name.to_string(), MethodSlot::Abstract);
        self
    }
}

impl std::fmt::Debug for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declaration")
            .field("selector", &self.selector)
            .field("inherits", &self.inherits)
            .field("is_override", &self.is_override)
            .field("expand", &self.expand.is_some())
            .field("dom_init", &self.dom_init.is_some())
            .field("subtree_ready", &self.subtree_ready.is_some())
            .field("default_mods", &self.default_mods)
            .field("default_params", &self.default_params)
            .field("tag", &self.tag)
            .field("on", &self.on.keys().collect::<Vec<_>>())
            .field("on_win", &self.on_win.keys().collect::<Vec<_>>())
            .field("on_mod", &self.on_mod.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
