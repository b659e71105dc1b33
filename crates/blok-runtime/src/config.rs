//! Runtime Configuration

use serde::Deserialize;

/// What happens when a declaration is registered during an active pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryPolicy {
    /// Reject with `RegistryLocked`
    #[default]
    Strict,
    /// Accept and drop memoised resolutions; already-composed nodes keep
    /// their old composition
    Permissive,
}

/// When host nodes are created for an attach request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachMode {
    /// Materialize and initialize inside `attach`
    #[default]
    Immediate,
    /// Queue the request until `Runtime::flush`
    Deferred,
}

/// Runtime configuration options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum rounds of content produced by structural hooks; descriptor
    /// nesting does not count
    pub max_expansion_depth: usize,

    pub registry_policy: RegistryPolicy,

    pub attach_mode: AttachMode,

    /// Host tag for nodes whose declaration has no tag override
    pub default_tag: String,
}

impl RuntimeConfig {
    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_expansion_depth: 256,
            registry_policy: RegistryPolicy::Strict,
            attach_mode: AttachMode::Immediate,
            default_tag: "div".to_string(),
        }
    }
}
