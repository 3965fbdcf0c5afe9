//! Configuration for node type import

use serde::{Deserialize, Serialize};

use crate::error::NodeTypeError;

/// Configuration for importing node type documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Send the document's `namespaces` to the namespace registry before building templates
    pub register_namespaces: bool,
    /// Children and properties without their own `namespace` use the node type's prefix
    pub inherit_namespace: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            register_namespaces: true,
            inherit_namespace: true,
        }
    }
}

impl ImportConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable namespace registration
    pub fn with_register_namespaces(mut self, enabled: bool) -> Self {
        self.register_namespaces = enabled;
        self
    }

    /// Enable/disable namespace inheritance for children and properties
    pub fn with_inherit_namespace(mut self, enabled: bool) -> Self {
        self.inherit_namespace = enabled;
        self
    }

    /// Load a config from YAML text; missing keys keep their defaults
    pub fn from_yaml(text: &str) -> Result<Self, NodeTypeError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
