// SPDX-License-Identifier: Apache-2.0

//! A serializable snapshot of a pipeline, for the root server's dashboard
//! endpoint.

use anacostia_engine::{NodeKind, NodeName, Status};
use serde::Serialize;

/// One node's observable state at the moment the snapshot was taken.
#[derive(Debug, Clone, Serialize)]
pub struct NodeModel {
    /// The node's name.
    pub name: NodeName,
    /// The node's kind.
    #[serde(serialize_with = "serialize_kind")]
    pub kind: NodeKind,
    /// The node's current status.
    #[serde(serialize_with = "serialize_status")]
    pub status: Status,
    /// Names of this node's predecessors.
    pub predecessors: Vec<NodeName>,
    /// Names of this node's successors.
    pub successors: Vec<NodeName>,
}

fn serialize_kind<S: serde::Serializer>(kind: &NodeKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(kind)
}

fn serialize_status<S: serde::Serializer>(status: &Status, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(status)
}

/// A snapshot of every node in a pipeline, in topological order.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineModel {
    /// Every node, in the order the pipeline launches them.
    pub nodes: Vec<NodeModel>,
}
