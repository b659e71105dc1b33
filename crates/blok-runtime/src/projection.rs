//! Document Projection
//!
//! Creates host nodes for expanded components and keeps their class string
//! and attributes in step with modifier and attribute changes.

use blok_dom::{ClassList, NodeId as DomNodeId};

use crate::{HostRef, Lifecycle, NodeId, Result, Runtime};

impl Runtime {
    /// Document class string of a node
    ///
    /// Base selector class, then one class per set modifier (in name
    /// order), then the declaration's extra classes. Text nodes have none.
    pub fn class_string(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        if node.is_text() {
            return String::new();
        }
        let selector = self.tree.selector(id);
        let mut classes = ClassList::new();
        classes.add(selector.as_str());
        for (name, value) in self.mods(id) {
            if let Some(class) = selector.mod_class(&name, &value) {
                classes.add(&class);
            }
        }
        if let Some(behavior) = self.behavior(id).ok().flatten() {
            for class in behavior.classes() {
                classes.add(class);
            }
        }
        classes.value()
    }

    /// Create host nodes for a subtree and insert it under `host_parent`
    /// before `before` (`NONE` appends)
    ///
    /// Nodes that already own a host node are re-inserted with their host
    /// subtree instead of being recreated.
    pub(crate) fn materialize(&mut self, root: NodeId, host_parent: HostRef, before: DomNodeId) -> Result<()> {
        let mut stack = vec![(root, host_parent, before)];
        let mut created = 0usize;

        while let Some((id, parent_host, before)) = stack.pop() {
            let node = self.tree.node(id)?;
            if node.state == Lifecycle::Removed {
                continue;
            }
            if let Some(existing) = node.host {
                self.host
                    .borrow_mut()
                    .insert_before(parent_host, existing, before)?;
                continue;
            }

            let host = self.create_host_node(id)?;
            self.host.borrow_mut().insert_before(parent_host, host, before)?;
            created += 1;

            let node = self.tree.node_mut(id)?;
            node.host = Some(host);
            if matches!(node.state, Lifecycle::Expanded | Lifecycle::Expanding) {
                node.state = Lifecycle::Attached;
            }
            self.host_index.insert(host, id);
            let children: Vec<_> = node.children.iter().rev().copied().collect();
            stack.extend(children.into_iter().map(|c| (c, host, DomNodeId::NONE)));
        }

        tracing::debug!(root = %root, host_parent = %host_parent, created, "attached subtree");
        Ok(())
    }

    fn create_host_node(&mut self, id: NodeId) -> Result<HostRef> {
        let node = self.tree.node(id)?;
        if let Some(text) = node.text() {
            return Ok(self.host.borrow_mut().create_text(text));
        }

        let behavior = self.behavior(id)?;
        let tag = behavior
            .as_ref()
            .and_then(|b| b.tag())
            .unwrap_or(self.config.default_tag.as_str())
            .to_string();
        let mut attrs: Vec<(String, String)> = behavior
            .as_ref()
            .map(|b| b.dom_attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        let node = self.tree.node(id)?;
        attrs.extend(node.dom_attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(ident) = &node.id {
            attrs.push(("id".to_string(), ident.clone()));
        }
        let class = self.class_string(id);

        let mut host = self.host.borrow_mut();
        let host_node = host.create_node(&tag);
        host.set_class(host_node, &class)?;
        for (name, value) in &attrs {
            host.set_attribute(host_node, name, value)?;
        }
        tracing::trace!(node = %id, host = %host_node, %tag, %class, "created host node");
        Ok(host_node)
    }

    /// Push the current class string of an attached node to the host
    pub(crate) fn sync_class(&mut self, id: NodeId) -> Result<()> {
        let Some(host) = self.host_of(id) else {
            return Ok(());
        };
        let class = self.class_string(id);
        self.host.borrow_mut().set_class(host, &class)?;
        Ok(())
    }

    /// Set a document attribute on a node, mirrored to its host node when
    /// attached
    pub fn set_dom_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        if node.state == Lifecycle::Removed {
            return Ok(());
        }
        node.dom_attrs.insert(name.to_string(), value.to_string());
        if let Some(host) = node.host {
            self.host.borrow_mut().set_attribute(host, name, value)?;
        }
        Ok(())
    }

    /// Document attribute as written by the declaration or at runtime
    pub fn dom_attr(&self, id: NodeId, name: &str) -> Option<String> {
        let node = self.tree.get(id)?;
        if let Some(value) = node.dom_attrs.get(name) {
            return Some(value.clone());
        }
        if name == "id" {
            return node.id.clone();
        }
        let behavior = self.behavior(id).ok().flatten()?;
        behavior.dom_attrs.get(name).cloned()
    }
}
