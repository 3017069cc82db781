// SPDX-License-Identifier: Apache-2.0

//! Node configuration specification.
//!
//! A node entry names the kind of node to build and carries an opaque
//! `config` value interpreted by that node's own setup code, the pipeline
//! engine never looks inside it.

use crate::kind::NodeKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User configuration for a single node in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NodeUserConfig {
    /// Which node kind to build.
    pub kind: NodeKind,

    /// An optional human-readable description of this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Node-specific configuration, interpreted by the node's own setup
    /// code and not validated by the pipeline engine.
    #[serde(default)]
    #[schemars(extend("x-kubernetes-preserve-unknown-fields" = true))]
    pub config: Value,
}

impl NodeUserConfig {
    /// Creates a bare config for `kind` with no node-specific settings.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            description: None,
            config: Value::Null,
        }
    }

    /// Attaches node-specific configuration.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_user_config_minimal_valid() {
        let json = r#"{ "kind": "resource" }"#;
        let cfg: NodeUserConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.kind, NodeKind::Resource);
        assert!(cfg.config.is_null());
    }

    #[test]
    fn node_user_config_rejects_unknown_fields() {
        let json = r#"{ "kind": "action", "nope": 1 }"#;
        let cfg: Result<NodeUserConfig, _> = serde_json::from_str(json);
        assert!(cfg.is_err());
    }

    #[test]
    fn node_user_config_from_yaml() {
        let yaml = "kind: metadata_store\nconfig: {}\n";
        let cfg: NodeUserConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.kind, NodeKind::MetadataStore);
    }
}
