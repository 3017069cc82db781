// SPDX-License-Identifier: Apache-2.0

//! [`MetadataStoreNode`]: the singleton root of a local pipeline, wrapping
//! [`NodeCore`] with the run loop described in the engine's run-loop
//! skeleton for the metadata-store role.

use crate::hooks::MetadataStoreHooks;
use crate::store::MetadataStore;
use anacostia_engine::{NodeCore, NodeKind, NodeName, SignalResult, Status, Trap, WorkTag};
use anacostia_channel::mpsc::Sender;
use anacostia_engine::NodeControlMsg;
use tracing::{error, info, instrument};

/// The metadata-store node: owns run identity and drives a run from start to
/// close. Every resource and action node in a pipeline has the metadata-store
/// as an implicit predecessor/successor pair through the run-opening and
/// run-closing handshake.
pub struct MetadataStoreNode<H: MetadataStoreHooks> {
    core: NodeCore,
    store: MetadataStore,
    hooks: H,
}

impl<H: MetadataStoreHooks> MetadataStoreNode<H> {
    /// Builds a new metadata-store node. Returns the node along with the
    /// control sender the pipeline keeps to reach it.
    #[must_use]
    pub fn new(name: NodeName, store: MetadataStore, hooks: H) -> (Self, Sender<NodeControlMsg>) {
        let (core, control_tx) = NodeCore::new(name, NodeKind::MetadataStore);
        (Self { core, store, hooks }, control_tx)
    }

    /// Mutable access to the shared node core, for the pipeline to wire
    /// predecessor/successor signal tables during construction.
    pub fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    /// Shared node core, for the pipeline and HTTP surface to read status,
    /// work tags, and names from.
    #[must_use]
    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    /// The backing store, cloneable and shared with resource/action nodes
    /// and the RPC callee surface.
    #[must_use]
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Drives one run to completion, then loops to start the next one.
    /// Returns once an exit has been requested and `on_exit` has run.
    #[instrument(skip(self), fields(node = %self.core.name))]
    pub async fn run(&mut self) {
        self.core.status.set(Status::Init);
        self.core.status.set(Status::Running);

        loop {
            if self.core.trap_interrupts().await == Trap::Exiting {
                break;
            }

            self.core.status.set(Status::Waiting);
            if self.core.wait_for_successors(SignalResult::Success).await == Trap::Exiting {
                break;
            }
            self.core.status.set(Status::Running);

            let run_id = self.store.run_id();
            {
                let _tag = self.core.work.track(WorkTag::StartingRun);
                if let Err(err) = self.hooks.start_run(run_id).await {
                    error!(%err, run_id, "start_run hook failed");
                }
                if let Err(err) = self.hooks.add_run_id(run_id).await {
                    error!(%err, run_id, "add_run_id hook failed");
                }
                self.store.stamp_open_entries(run_id);
            }
            info!(run_id, "run opened");

            self.core.signal_successors(SignalResult::Success);

            self.core.status.set(Status::Waiting);
            if self.core.wait_for_successors(SignalResult::Success).await == Trap::Exiting {
                break;
            }
            self.core.status.set(Status::Running);

            {
                let _tag = self.core.work.track(WorkTag::EndingRun);
                if let Err(err) = self.hooks.add_end_time(run_id).await {
                    error!(%err, run_id, "add_end_time hook failed");
                }
                if let Err(err) = self.hooks.end_run(run_id).await {
                    error!(%err, run_id, "end_run hook failed");
                }
                self.store.advance_all_entry_states(run_id);
            }
            let next_run_id = self.store.advance_run_id();
            info!(run_id, next_run_id, "run closed");

            self.core.signal_successors(SignalResult::Success);
        }

        if let Err(err) = self.hooks.on_exit().await {
            error!(%err, "on_exit hook failed");
        }
        self.core.status.set(Status::Exited);
        info!("metadata-store node exited");
    }
}
