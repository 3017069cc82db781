// SPDX-License-Identifier: Apache-2.0

//! [`NodeCore`]: the runtime state every node kind (metadata-store,
//! resource, action, RPC sender/receiver) is built around — status, signal
//! mailboxes, work list, and the control channel.
//!
//! Predecessor/successor references are modeled as shared [`SignalTable`]
//! handles rather than back-references to full node objects: a node never
//! holds a reference to its neighbour, only to the mailbox it writes into.
//! This sidesteps the reference-cycle problem an arena-of-nodes design
//! exists to solve, without needing a central registry lookup on every
//! signal send.

use crate::control::{NodeControlMsg, Trap, WAIT_POLL_INTERVAL, trap_interrupts};
use crate::node::{NodeKind, NodeName};
use crate::signal::{Signal, SignalResult, SignalTable};
use crate::status::{SharedStatus, Status};
use crate::work::{WorkList, WorkTag};
use anacostia_channel::mpsc::{Channel, Receiver};

/// Runtime state shared by every node kind.
pub struct NodeCore {
    /// This node's unique name.
    pub name: NodeName,
    /// This node's kind.
    pub kind: NodeKind,
    /// This node's status cell. Cloned out to the pipeline at construction
    /// so pause/terminate requests can be delivered without a channel round
    /// trip.
    pub status: SharedStatus,
    /// This node's work-tag list, cloned out to the HTTP surface.
    pub work: WorkList,

    predecessor_names: Vec<NodeName>,
    successor_names: Vec<NodeName>,

    /// Mailbox for signals sent *to* this node *by* its predecessors.
    predecessors_signals: SignalTable,
    /// Mailbox for signals sent *to* this node *by* its successors.
    successors_signals: SignalTable,

    /// Each predecessor's own `successors_signals` mailbox, so this node can
    /// deliver a signal *to* that predecessor.
    predecessor_targets: Vec<(NodeName, SignalTable)>,
    /// Each successor's own `predecessors_signals` mailbox.
    successor_targets: Vec<(NodeName, SignalTable)>,

    control_rx: Receiver<NodeControlMsg>,
}

impl NodeCore {
    /// Creates a fresh node core with no neighbours wired yet. Returns the
    /// core along with the control-message sender the pipeline should keep
    /// to reach this node later.
    #[must_use]
    pub fn new(name: NodeName, kind: NodeKind) -> (Self, anacostia_channel::mpsc::Sender<NodeControlMsg>) {
        let (control_tx, control_rx) = Channel::new(16);
        let core = Self {
            name,
            kind,
            status: SharedStatus::new(Status::Off),
            work: WorkList::new(),
            predecessor_names: Vec::new(),
            successor_names: Vec::new(),
            predecessors_signals: SignalTable::new(),
            successors_signals: SignalTable::new(),
            predecessor_targets: Vec::new(),
            successor_targets: Vec::new(),
            control_rx,
        };
        (core, control_tx)
    }

    /// This node's own `successors_signals` mailbox — the table a
    /// successor writes into when it signals this node.
    #[must_use]
    pub fn successors_signals_table(&self) -> SignalTable {
        self.successors_signals.clone()
    }

    /// This node's own `predecessors_signals` mailbox — the table a
    /// predecessor writes into when it signals this node.
    #[must_use]
    pub fn predecessors_signals_table(&self) -> SignalTable {
        self.predecessors_signals.clone()
    }

    /// Wires `predecessor` as a predecessor of this node: `target` is the
    /// predecessor's own `successors_signals` mailbox, i.e. where this node
    /// must `put` when it calls `signal_predecessors`.
    pub fn connect_predecessor(&mut self, predecessor: NodeName, target: SignalTable) {
        self.predecessor_names.push(predecessor.clone());
        self.predecessor_targets.push((predecessor, target));
    }

    /// Wires `successor` as a successor of this node: `target` is the
    /// successor's own `predecessors_signals` mailbox.
    pub fn connect_successor(&mut self, successor: NodeName, target: SignalTable) {
        self.successor_names.push(successor.clone());
        self.successor_targets.push((successor, target));
    }

    /// Names of this node's predecessors, in wiring order.
    #[must_use]
    pub fn predecessor_names(&self) -> &[NodeName] {
        &self.predecessor_names
    }

    /// Names of this node's successors, in wiring order.
    #[must_use]
    pub fn successor_names(&self) -> &[NodeName] {
        &self.successor_names
    }

    /// Sends `result` to every predecessor's `successors_signals` mailbox.
    pub fn signal_predecessors(&self, result: SignalResult) {
        for (name, table) in &self.predecessor_targets {
            table.put(Signal::new(self.name.clone(), name.clone(), result));
        }
    }

    /// Sends `result` to every successor's `predecessors_signals` mailbox.
    pub fn signal_successors(&self, result: SignalResult) {
        for (name, table) in &self.successor_targets {
            table.put(Signal::new(self.name.clone(), name.clone(), result));
        }
    }

    /// Runs `trap_interrupts` once. Every wait loop below calls this at
    /// each cooperative yield.
    pub async fn trap_interrupts(&self) -> Trap {
        trap_interrupts(&self.status, &self.control_rx).await
    }

    /// Blocks (cooperatively) until every predecessor has signalled
    /// `required`, or until an exit is requested. Tags the work list with
    /// [`WorkTag::WaitingPredecessors`] while waiting.
    pub async fn wait_for_predecessors(&self, required: SignalResult) -> Trap {
        let _tag = self.work.track(WorkTag::WaitingPredecessors);
        loop {
            if self.trap_interrupts().await == Trap::Exiting {
                return Trap::Exiting;
            }
            if self
                .predecessors_signals
                .check_all(&self.predecessor_names, required)
            {
                return Trap::Continue;
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Blocks (cooperatively) until every successor has signalled
    /// `required`, or until an exit is requested. Tags the work list with
    /// [`WorkTag::WaitingSuccessors`] while waiting.
    pub async fn wait_for_successors(&self, required: SignalResult) -> Trap {
        let _tag = self.work.track(WorkTag::WaitingSuccessors);
        loop {
            if self.trap_interrupts().await == Trap::Exiting {
                return Trap::Exiting;
            }
            if self
                .successors_signals
                .check_all(&self.successor_names, required)
            {
                return Trap::Continue;
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on_local<F: std::future::Future<Output = T> + 'static, T: 'static>(fut: F) -> T {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build runtime");
        let local = tokio::task::LocalSet::new();
        local.block_on(&rt, fut)
    }

    #[test]
    fn signal_predecessors_lands_in_the_predecessors_successors_table() {
        let (mut downstream, _tx) = NodeCore::new("action".into(), NodeKind::Action);
        let (upstream, _tx2) = NodeCore::new("resource".into(), NodeKind::Resource);

        downstream.connect_predecessor("resource".into(), upstream.successors_signals_table());

        downstream.signal_predecessors(SignalResult::Success);

        assert!(
            upstream
                .successors_signals
                .check_all(&["action".into()], SignalResult::Success)
        );
    }

    #[test]
    fn wait_for_predecessors_unblocks_once_all_have_signalled() {
        let (mut downstream, _tx) = NodeCore::new("action".into(), NodeKind::Action);
        let (mut upstream_a, _tx_a) = NodeCore::new("a".into(), NodeKind::Resource);
        let (mut upstream_b, _tx_b) = NodeCore::new("b".into(), NodeKind::Resource);

        downstream.connect_predecessor("a".into(), upstream_a.successors_signals_table());
        downstream.connect_predecessor("b".into(), upstream_b.successors_signals_table());
        upstream_a.connect_successor("action".into(), downstream.predecessors_signals_table());
        upstream_b.connect_successor("action".into(), downstream.predecessors_signals_table());
        downstream.status.set(Status::Running);

        upstream_a.signal_successors(SignalResult::Success);

        let outcome = block_on_local(async {
            tokio::time::timeout(
                std::time::Duration::from_millis(50),
                downstream.wait_for_predecessors(SignalResult::Success),
            )
            .await
        });
        assert!(outcome.is_err(), "must still be waiting on b");

        upstream_b.signal_successors(SignalResult::Success);
        let trap = block_on_local(downstream.wait_for_predecessors(SignalResult::Success));
        assert_eq!(trap, Trap::Continue);
    }
}
