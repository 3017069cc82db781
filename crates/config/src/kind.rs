// SPDX-License-Identifier: Apache-2.0

//! The node kind as it appears in configuration, mirrored onto
//! [`anacostia_engine::NodeKind`] at load time.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which of the five node kinds a `nodes` entry configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The singleton run-identity owner.
    MetadataStore,
    /// Watches a backing store and triggers runs.
    Resource,
    /// Runs user logic once per run.
    Action,
    /// Forwards signals to a remote receiver over HTTP.
    RpcSender,
    /// Accepts signals forwarded from a remote sender over HTTP.
    RpcReceiver,
}

impl From<NodeKind> for anacostia_engine::NodeKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::MetadataStore => anacostia_engine::NodeKind::MetadataStore,
            NodeKind::Resource => anacostia_engine::NodeKind::Resource,
            NodeKind::Action => anacostia_engine::NodeKind::Action,
            NodeKind::RpcSender => anacostia_engine::NodeKind::RpcSender,
            NodeKind::RpcReceiver => anacostia_engine::NodeKind::RpcReceiver,
        }
    }
}
