//! Runtime errors

use crate::NodeId;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Lifecycle phase a user hook was running in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Expand,
    Attach,
    SubtreeReady,
    Event,
    ModChange,
    Method,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Expand => "expand",
            Self::Attach => "attach",
            Self::SubtreeReady => "subtree-ready",
            Self::Event => "event",
            Self::ModChange => "mod-change",
            Self::Method => "method",
        };
        f.write_str(name)
    }
}

/// Runtime errors
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("unknown selector `{0}`")]
    UnknownSelector(String),

    #[error("cyclic inheritance: {}", .0.join(" -> "))]
    CyclicInheritance(Vec<String>),

    #[error("selector `{0}` is already declared")]
    Conflict(String),

    #[error("expansion of `{selector}` exceeded depth limit {limit}")]
    ExpansionDepthExceeded { selector: String, limit: usize },

    #[error("abstract method `{method}` called on `{selector}` without an implementation")]
    AbstractMethod { selector: String, method: String },

    #[error("`inherited` called outside of a chained hook or method")]
    InvalidContext,

    #[error("registry is locked while `{0}` is being declared")]
    RegistryLocked(String),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {child} cannot be placed under {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {0} is not a root and cannot be attached on its own")]
    NotARoot(NodeId),

    #[error("method `{method}` is not declared on `{selector}`")]
    UnknownMethod { selector: String, method: String },

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Raised by a user hook or handler body
    #[error("{phase} handler of `{selector}` failed: {message}")]
    Handler {
        selector: String,
        phase: Phase,
        message: String,
    },

    #[error("host document error: {0}")]
    Host(#[from] blok_dom::DomError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl RuntimeError {
    /// Build a handler error; for use inside hook bodies
    pub fn handler(selector: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        Self::Handler {
            selector: selector.into(),
            phase,
            message: message.into(),
        }
    }

    /// Whether this error signals a declaration authoring defect
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnknownSelector(_)
                | Self::CyclicInheritance(_)
                | Self::Conflict(_)
                | Self::ExpansionDepthExceeded { .. }
                | Self::InvalidContext
                | Self::RegistryLocked(_)
        )
    }
}
