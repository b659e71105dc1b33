//! Modifier/Parameter Store
//!
//! Parameters are fixed at node creation; modifiers are mutable, default
//! seeded from the composed declaration and reflected as document classes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::selector::mod_key;
use crate::{Context, Lifecycle, ModValue, NodeId, Result, Runtime};

impl Runtime {
    /// Current value of a modifier: explicit value, else declared default
    pub fn get_mod(&self, id: NodeId, name: &str) -> Option<ModValue> {
        let key = mod_key(name);
        if let Some(value) = self.tree.get(id)?.mods.get(&key) {
            return Some(value.clone());
        }
        let behavior = self.behavior(id).ok().flatten()?;
        behavior.default_mod(&key).cloned()
    }

    /// Effective modifiers: declared defaults overlaid by explicit values
    pub fn mods(&self, id: NodeId) -> BTreeMap<String, ModValue> {
        let mut mods = match self.behavior(id).ok().flatten() {
            Some(behavior) => behavior.default_mods.clone(),
            None => BTreeMap::new(),
        };
        if let Some(node) = self.tree.get(id) {
            mods.extend(node.mods.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        mods
    }

    /// Set a modifier
    ///
    /// Setting the current value is a no-op. Otherwise the value is stored,
    /// the host class string is resynchronised and the matching change
    /// handler runs with `(new, previous)` before this returns. Removed
    /// nodes ignore the call.
    pub fn set_mod(&mut self, id: NodeId, name: &str, value: impl Into<ModValue>) -> Result<()> {
        let value = value.into();
        let key = mod_key(name);
        if self.tree.node(id)?.state == Lifecycle::Removed {
            tracing::warn!(node = %id, name = %key, "modifier set on a removed node ignored");
            return Ok(());
        }

        let previous = self.get_mod(id, &key);
        if previous.as_ref() == Some(&value) {
            return Ok(());
        }

        tracing::trace!(node = %id, name = %key, %value, ?previous, "set modifier");
        self.tree
            .node_mut(id)?
            .mods
            .insert(key.clone(), value.clone());
        self.sync_class(id)?;

        let handler = self
            .behavior(id)?
            .and_then(|behavior| behavior.on_mod.get(&key).cloned());
        if let Some(handler) = handler {
            self.with_lock(|rt| {
                let mut cx = Context::new(rt, id);
                handler(&mut cx, &value, previous.as_ref())
            })?;
        }
        Ok(())
    }

    /// Flip a modifier between two values
    ///
    /// Any current value other than `on` switches to `on`.
    pub fn toggle_mod(
        &mut self,
        id: NodeId,
        name: &str,
        on: impl Into<ModValue>,
        off: impl Into<ModValue>,
    ) -> Result<()> {
        let on = on.into();
        let next = if self.get_mod(id, name).as_ref() == Some(&on) {
            off.into()
        } else {
            on
        };
        self.set_mod(id, name, next)
    }

    /// Descriptor-supplied parameter, else declared default
    pub fn param(&self, id: NodeId, name: &str) -> Option<Value> {
        if let Some(value) = self.tree.get(id)?.params.get(name) {
            return Some(value.clone());
        }
        let behavior = self.behavior(id).ok().flatten()?;
        behavior.default_param(name).cloned()
    }

    /// Effective parameters: declared defaults overlaid by descriptor values
    pub fn params(&self, id: NodeId) -> BTreeMap<String, Value> {
        let mut params = match self.behavior(id).ok().flatten() {
            Some(behavior) => behavior.default_params.clone(),
            None => BTreeMap::new(),
        };
        if let Some(node) = self.tree.get(id) {
            params.extend(node.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        params
    }
}
