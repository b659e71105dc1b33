//! blok runtime - Block/element component runtime
//!
//! Resolves a tree of node descriptors against a registry of behavior
//! declarations, expands it to a fixpoint, projects it into a host
//! document and dispatches lifecycle, modifier and document events.
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register(
//!     Declaration::new("Tab")
//!         .default_mod("State", "inactive")
//!         .expand(|cx| cx.append(NodeDescriptor::new("close")).map(|_| ())),
//! )?;
//!
//! let (mut rt, doc) = Runtime::with_document(registry, RuntimeConfig::default());
//! let body = doc.borrow().body();
//! let tab = rt.mount(&NodeDescriptor::new("Tab").attr("State", "active"), body)?;
//! assert_eq!(rt.class_string(tab), "tab tab_state_active");
//! ```

mod config;
mod context;
mod declaration;
mod descriptor;
mod dispatch;
mod error;
mod expand;
mod modifiers;
mod node;
mod projection;
mod registry;
mod runtime;
mod selector;
mod tree;
mod value;

pub use config::{AttachMode, RegistryPolicy, RuntimeConfig};
pub use context::Context;
pub use declaration::{Declaration, EventHandler, Hook, Method, MethodSlot, ModHandler};
pub use descriptor::{Content, NodeDescriptor};
pub use error::{Phase, Result, RuntimeError};
pub use node::{Lifecycle, Node, NodeId, NodeKind};
pub use registry::{ComposedDeclaration, HookChain, MethodChain, Registry};
pub use runtime::{Runtime, SharedHost};
pub use selector::{class_name, Selector};
pub use tree::NodeTree;
pub use value::ModValue;

pub use blok_dom::{Document, Event, HostDocument, HostTarget};
pub use serde_json::Value;

/// Host document node a component is projected to
pub type HostRef = blok_dom::NodeId;

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
