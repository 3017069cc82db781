// SPDX-License-Identifier: Apache-2.0

//! [`Pipeline`]: wires a set of nodes into a DAG, launches one OS thread per
//! node, and drives pause/resume/terminate across the whole graph.

use crate::dag;
use crate::error::Error;
use crate::model::{NodeModel, PipelineModel};
use crate::node_trait::PipelineNode;
use crate::thread_task::{NodeThreadHandle, spawn_node_thread};
use anacostia_channel::mpsc::Sender;
use anacostia_engine::control::ControlSenders;
use anacostia_engine::{NodeControlMsg, NodeKind, NodeName, SharedStatus};
use std::collections::HashMap;
use tracing::error;

/// One node submitted to [`Pipeline::build`], together with the
/// predecessor names it declared.
pub struct NodeEntry {
    node: Box<dyn PipelineNode>,
    control_tx: Sender<NodeControlMsg>,
    predecessors: Vec<NodeName>,
}

impl NodeEntry {
    /// Wraps a node and the control sender returned alongside it, declaring
    /// `predecessors` as the nodes it waits on.
    pub fn new(
        node: Box<dyn PipelineNode>,
        control_tx: Sender<NodeControlMsg>,
        predecessors: Vec<NodeName>,
    ) -> Self {
        Self {
            node,
            control_tx,
            predecessors,
        }
    }
}

enum Nodes {
    Built(HashMap<NodeName, Box<dyn PipelineNode>>),
    Launched(Vec<NodeThreadHandle>),
}

/// A constructed, wired pipeline. Built once from an unordered list of
/// [`NodeEntry`] values, then launched, paused/resumed any number of times,
/// and finally terminated.
pub struct Pipeline {
    order: Vec<NodeName>,
    reverse_order: Vec<NodeName>,
    predecessors: HashMap<NodeName, Vec<NodeName>>,
    successors: HashMap<NodeName, Vec<NodeName>>,
    statuses: HashMap<NodeName, (SharedStatus, NodeKind)>,
    control_senders: ControlSenders,
    nodes: Nodes,
}

impl Pipeline {
    /// Builds a pipeline from an unordered list of nodes. Fails if any two
    /// nodes share a name, any predecessor is unknown, the graph has a
    /// cycle, or the graph does not have exactly one metadata-store node.
    pub fn build(entries: Vec<NodeEntry>) -> Result<Self, Error> {
        let mut predecessors = HashMap::with_capacity(entries.len());
        for entry in &entries {
            let name = entry.node.core().name.clone();
            if predecessors.insert(name.clone(), entry.predecessors.clone()).is_some() {
                return Err(Error::DuplicateNodeName { name });
            }
        }

        let metadata_store_count = entries
            .iter()
            .filter(|e| e.node.core().kind == NodeKind::MetadataStore)
            .count();
        if metadata_store_count != 1 {
            return Err(Error::WrongMetadataStoreCount {
                found: metadata_store_count,
            });
        }

        let (successors, order) = dag::build_successors_and_order(&predecessors)?;

        let pred_tables: HashMap<_, _> = entries
            .iter()
            .map(|e| (e.node.core().name.clone(), e.node.core().predecessors_signals_table()))
            .collect();
        let succ_tables: HashMap<_, _> = entries
            .iter()
            .map(|e| (e.node.core().name.clone(), e.node.core().successors_signals_table()))
            .collect();

        let mut control_senders = ControlSenders::new();
        let mut statuses = HashMap::with_capacity(entries.len());
        let mut nodes = HashMap::with_capacity(entries.len());

        for mut entry in entries {
            let name = entry.node.core().name.clone();
            let kind = entry.node.core().kind;
            let _ = statuses.insert(name.clone(), (entry.node.core().status.clone(), kind));
            control_senders.register(name.clone(), entry.control_tx);

            for pred in &entry.predecessors {
                let target = succ_tables
                    .get(pred)
                    .expect("predecessor validated by build_successors_and_order")
                    .clone();
                entry.node.core_mut().connect_predecessor(pred.clone(), target);
            }
            for succ in successors.get(&name).cloned().unwrap_or_default() {
                let target = pred_tables
                    .get(&succ)
                    .expect("successor derived from validated predecessor map")
                    .clone();
                entry.node.core_mut().connect_successor(succ, target);
            }

            let _ = nodes.insert(name, entry.node);
        }

        let reverse_order: Vec<NodeName> = order.iter().rev().cloned().collect();

        Ok(Self {
            order,
            reverse_order,
            predecessors,
            successors,
            statuses,
            control_senders,
            nodes: Nodes::Built(nodes),
        })
    }

    /// Spawns one OS thread per node, in topological order. Consumes the
    /// built node objects; calling this twice is a programmer error and
    /// panics.
    pub fn launch(&mut self) -> Result<(), Error> {
        let Nodes::Built(nodes) = &mut self.nodes else {
            panic!("pipeline already launched");
        };

        let mut handles = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let mut node = nodes
                .remove(name)
                .expect("every node in `order` was inserted during build");
            let thread_name = name.to_string();
            let handle = spawn_node_thread(thread_name, move || async move {
                node.run().await;
            })?;
            handles.push(handle);
        }

        self.nodes = Nodes::Launched(handles);
        Ok(())
    }

    /// Requests every node pause, in reverse topological order (successors
    /// before predecessors), so a paused node's predecessors keep running
    /// just long enough to observe the pause signal downstream.
    pub fn pause(&self) {
        for err in self.control_senders.broadcast_in_order(&self.reverse_order, &NodeControlMsg::Pause) {
            error!(%err, "failed to deliver pause request");
        }
    }

    /// Requests every node resume, in topological order.
    pub fn resume(&self) {
        for err in self.control_senders.broadcast_in_order(&self.order, &NodeControlMsg::Resume) {
            error!(%err, "failed to deliver resume request");
        }
    }

    /// Requests every node terminate, in reverse topological order, then
    /// joins every node's thread. Consumes the pipeline.
    pub fn terminate(mut self) -> Result<(), Error> {
        let msg = NodeControlMsg::Terminate {
            reason: "pipeline shutdown".to_string(),
        };
        for err in self.control_senders.broadcast_in_order(&self.reverse_order, &msg) {
            error!(%err, "failed to deliver terminate request");
        }

        match std::mem::replace(&mut self.nodes, Nodes::Built(HashMap::new())) {
            Nodes::Built(_) => Ok(()),
            Nodes::Launched(handles) => {
                for handle in handles {
                    handle.join()?;
                }
                Ok(())
            }
        }
    }

    /// A serializable snapshot of every node's current status, in
    /// topological order.
    #[must_use]
    pub fn model(&self) -> PipelineModel {
        let nodes = self
            .order
            .iter()
            .map(|name| {
                let (status, kind) = self.statuses.get(name).expect("every ordered node has a status");
                NodeModel {
                    name: name.clone(),
                    kind: *kind,
                    status: status.get(),
                    predecessors: self.predecessors.get(name).cloned().unwrap_or_default(),
                    successors: self.successors.get(name).cloned().unwrap_or_default(),
                }
            })
            .collect();
        PipelineModel { nodes }
    }

    /// Nodes in topological order.
    #[must_use]
    pub fn order(&self) -> &[NodeName] {
        &self.order
    }
}
