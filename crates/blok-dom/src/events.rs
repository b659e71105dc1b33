//! Host events and listener bookkeeping
//!
//! The host never stores callbacks. A listener is an opaque
//! [`ListenerKey`] chosen by whoever binds it; dispatching an event means
//! asking the registry which keys are bound for a target and event name.

use std::collections::HashMap;

use crate::NodeId;

/// Where a listener is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostTarget {
    /// A node of the host tree
    Node(NodeId),
    /// The process-wide window-equivalent target
    Window,
}

/// Opaque listener handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerKey(pub u64);

/// Listener registry keyed by target and event name
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<(HostTarget, String), Vec<ListenerKey>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a listener; binding the same key twice is a no-op
    pub fn add(&mut self, target: HostTarget, event: &str, key: ListenerKey) {
        let keys = self.listeners.entry((target, event.to_string())).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Unbind a listener, returns true when it was bound
    pub fn remove(&mut self, target: HostTarget, event: &str, key: ListenerKey) -> bool {
        let slot = (target, event.to_string());
        let Some(keys) = self.listeners.get_mut(&slot) else {
            return false;
        };
        let before = keys.len();
        keys.retain(|k| *k != key);
        let removed = keys.len() != before;
        if keys.is_empty() {
            self.listeners.remove(&slot);
        }
        removed
    }

    /// Keys bound for a target/event pair, in binding order
    pub fn get(&self, target: HostTarget, event: &str) -> Vec<ListenerKey> {
        self.listeners
            .get(&(target, event.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of listeners bound on a target
    pub fn count_for(&self, target: HostTarget) -> usize {
        self.listeners
            .iter()
            .filter(|((t, _), _)| *t == target)
            .map(|(_, keys)| keys.len())
            .sum()
    }

    /// Total number of bound listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Event delivered by the host (or triggered by components)
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    /// Free-form payload
    pub detail: Option<String>,
    pub bubbles: bool,
    propagation_stopped: bool,
    default_prevented: bool,
}

impl Event {
    /// Create a bubbling event
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            detail: None,
            bubbles: true,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    /// Create an event that is delivered to its target only
    pub fn non_bubbling(name: &str) -> Self {
        Self {
            bubbles: false,
            ..Self::new(name)
        }
    }

    /// Attach a payload
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Stop propagation to ancestors
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_listener() {
        let mut reg = ListenerRegistry::new();
        let target = HostTarget::Node(NodeId(3));
        reg.add(target, "click", ListenerKey(1));
        reg.add(target, "click", ListenerKey(1));
        reg.add(target, "click", ListenerKey(2));
        reg.add(HostTarget::Window, "resize", ListenerKey(3));

        assert_eq!(reg.get(target, "click"), vec![ListenerKey(1), ListenerKey(2)]);
        assert_eq!(reg.count_for(target), 2);
        assert_eq!(reg.len(), 3);

        assert!(reg.remove(target, "click", ListenerKey(1)));
        assert!(!reg.remove(target, "click", ListenerKey(1)));
        assert!(reg.remove(HostTarget::Window, "resize", ListenerKey(3)));
        assert_eq!(reg.count_for(HostTarget::Window), 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_event_flags() {
        let mut event = Event::new("click").with_detail("left");
        assert!(event.bubbles);
        assert_eq!(event.detail.as_deref(), Some("left"));
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
        assert!(!Event::non_bubbling("focus").bubbles);
    }
}
