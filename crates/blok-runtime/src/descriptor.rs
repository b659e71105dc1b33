//! Node descriptors
//!
//! The input tree: `{ name, attributes, children }` records as produced by
//! a markup compiler or written by hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::selector::{is_block_name, mod_key};
use crate::{ModValue, Result, RuntimeError};

/// One node of the input tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub children: Vec<Content>,
}

/// Child content: a nested descriptor or a text run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Node(NodeDescriptor),
}

/// Attributes sorted into the node's stores
#[derive(Debug, Default)]
pub(crate) struct SplitAttributes {
    pub params: BTreeMap<String, Value>,
    pub mods: BTreeMap<String, ModValue>,
    pub id: Option<String>,
}

impl NodeDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: None,
            children: Vec::new(),
        }
    }

    /// Parse a descriptor tree from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RuntimeError::InvalidDescriptor(e.to_string()))
    }

    /// Set an attribute (uppercase keys are modifiers)
    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn child(mut self, content: impl Into<Content>) -> Self {
        self.children.push(content.into());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(Content::Text(text.to_string()))
    }

    pub(crate) fn split_attributes(&self) -> Result<SplitAttributes> {
        let mut split = SplitAttributes::default();
        let Some(attributes) = &self.attributes else {
            return Ok(split);
        };
        for (key, value) in attributes {
            if is_block_name(key) {
                let m = ModValue::from_json(value).ok_or_else(|| {
                    RuntimeError::InvalidDescriptor(format!(
                        "modifier `{key}` of `{}` must be a boolean or string",
                        self.name
                    ))
                })?;
                split.mods.insert(mod_key(key), m);
                continue;
            }
            if key == "id" {
                split.id = value.as_str().map(str::to_string);
            }
            split.params.insert(key.clone(), value.clone());
        }
        Ok(split)
    }
}

impl From<NodeDescriptor> for Content {
    fn from(desc: NodeDescriptor) -> Self {
        Self::Node(desc)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
