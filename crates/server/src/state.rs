// SPDX-License-Identifier: Apache-2.0

//! Shared state every route handler reads from: per-node status/work
//! handles, per-node RPC events, per-resource-node backends, and the
//! metadata-store.

use anacostia_engine::{NodeKind, NodeName, SharedStatus, WorkList};
use anacostia_metadata::MetadataStore;
use anacostia_pipeline::{NodeModel, PipelineModel};
use anacostia_resource::FilesystemResource;
use anacostia_rpc::RpcEvent;
use std::collections::HashMap;
use std::sync::Arc;

/// Status and work-tag handles for every node mounted on a server, keyed by
/// node name. Collected at pipeline-wiring time, before nodes are moved
/// onto their dedicated threads, together with enough of the static DAG
/// shape (kind, declared predecessors, registration order) to answer
/// `GET /api/pipeline` without needing a live [`anacostia_pipeline::Pipeline`]
/// handle, which the router is built before the pipeline is launched.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    order: Vec<NodeName>,
    kind: HashMap<NodeName, NodeKind>,
    status: HashMap<NodeName, SharedStatus>,
    work: HashMap<NodeName, WorkList>,
    predecessors: HashMap<NodeName, Vec<NodeName>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node`'s kind, status and work-list handles, and its
    /// declared predecessors.
    pub fn register(&mut self, node: NodeName, kind: NodeKind, status: SharedStatus, work: WorkList, predecessors: Vec<NodeName>) {
        self.order.push(node.clone());
        let _ = self.kind.insert(node.clone(), kind);
        let _ = self.status.insert(node.clone(), status);
        let _ = self.work.insert(node.clone(), work);
        let _ = self.predecessors.insert(node, predecessors);
    }

    /// The status handle for `node`, if mounted on this server.
    #[must_use]
    pub fn status_of(&self, node: &NodeName) -> Option<&SharedStatus> {
        self.status.get(node)
    }

    /// The work-list handle for `node`, if mounted on this server.
    #[must_use]
    pub fn work_of(&self, node: &NodeName) -> Option<&WorkList> {
        self.work.get(node)
    }

    /// A snapshot of every registered node's observable state, in
    /// registration order, with successors derived from every other node's
    /// declared predecessors.
    #[must_use]
    pub fn model(&self) -> PipelineModel {
        let mut successors: HashMap<&NodeName, Vec<NodeName>> = HashMap::new();
        for (node, preds) in &self.predecessors {
            for pred in preds {
                successors.entry(pred).or_default().push(node.clone());
            }
        }

        let nodes = self
            .order
            .iter()
            .filter_map(|name| {
                Some(NodeModel {
                    name: name.clone(),
                    kind: *self.kind.get(name)?,
                    status: self.status.get(name)?.get(),
                    predecessors: self.predecessors.get(name).cloned().unwrap_or_default(),
                    successors: successors.get(name).cloned().unwrap_or_default(),
                })
            })
            .collect();

        PipelineModel { nodes }
    }
}

/// RPC event mailboxes for every sender/receiver node mounted on a server.
#[derive(Clone, Default)]
pub struct RpcRegistry {
    signal_root: HashMap<NodeName, RpcEvent>,
    signal_leaf: HashMap<NodeName, RpcEvent>,
}

impl RpcRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sender node's `/signal_root` event.
    pub fn register_sender(&mut self, node: NodeName, event: RpcEvent) {
        let _ = self.signal_root.insert(node, event);
    }

    /// Registers a receiver node's `/signal_leaf` event.
    pub fn register_receiver(&mut self, node: NodeName, event: RpcEvent) {
        let _ = self.signal_leaf.insert(node, event);
    }

    /// The `/signal_root` event for `node`, if it is a sender mounted here.
    #[must_use]
    pub fn signal_root_of(&self, node: &NodeName) -> Option<&RpcEvent> {
        self.signal_root.get(node)
    }

    /// The `/signal_leaf` event for `node`, if it is a receiver mounted here.
    #[must_use]
    pub fn signal_leaf_of(&self, node: &NodeName) -> Option<&RpcEvent> {
        self.signal_leaf.get(node)
    }
}

/// Backends for every resource node mounted on a server.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<NodeName, Arc<FilesystemResource>>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node`'s backend.
    pub fn register(&mut self, node: NodeName, resource: Arc<FilesystemResource>) {
        let _ = self.resources.insert(node, resource);
    }

    /// The backend for `node`, if mounted on this server.
    #[must_use]
    pub fn get(&self, node: &NodeName) -> Option<&Arc<FilesystemResource>> {
        self.resources.get(node)
    }
}

/// Everything a mounted route handler might need, grouped so the router can
/// be built once and shared across every route.
#[derive(Clone, Default)]
pub struct AppState {
    /// Status/work handles for every locally mounted node.
    pub nodes: NodeRegistry,
    /// RPC event mailboxes for every locally mounted sender/receiver.
    pub rpc: RpcRegistry,
    /// Backends for every locally mounted resource node.
    pub resources: ResourceRegistry,
    /// The pipeline's metadata-store, shared with its node.
    pub metadata: MetadataStore,
}
