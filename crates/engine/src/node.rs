// SPDX-License-Identifier: Apache-2.0

//! Node identity and classification shared by every node kind in the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A globally unique node name, assigned once at pipeline construction and
/// never reused. Cheaply cloneable (`Arc<str>` under the hood) since every
/// [`crate::signal::SignalTable`] entry and work-tag observer carries one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeName(Arc<str>);

impl NodeName {
    /// Builds a node name from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Distinguishes the four node kinds a pipeline can wire together. RPC
/// sender/receiver nodes are stand-ins for a remote node and are kept
/// distinct from the metadata-store/resource/action trio so the pipeline can
/// apply kind-specific invariants (e.g. "exactly one metadata-store node").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The singleton root of a local DAG; owns run identity.
    MetadataStore,
    /// Watches an external backing store and triggers runs.
    Resource,
    /// Runs user logic once per run.
    Action,
    /// Forwards signals to a remote receiver over HTTP.
    RpcSender,
    /// Accepts signals forwarded from a remote sender over HTTP.
    RpcReceiver,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::MetadataStore => "metadata_store",
            NodeKind::Resource => "resource",
            NodeKind::Action => "action",
            NodeKind::RpcSender => "rpc_sender",
            NodeKind::RpcReceiver => "rpc_receiver",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_name_displays_as_str() {
        let name: NodeName = "resource_a".into();
        assert_eq!(name.as_str(), "resource_a");
        assert_eq!(name.to_string(), "resource_a");
    }

    #[test]
    fn node_name_equality_is_value_based() {
        let a: NodeName = "x".into();
        let b: NodeName = String::from("x").into();
        assert_eq!(a, b);
    }
}
