// SPDX-License-Identifier: Apache-2.0

//! [`ResourceNode`]: watches a backing store and brokers one run per
//! metadata-store cycle on its behalf.

use crate::hooks::ResourceHooks;
use anacostia_channel::mpsc::Sender;
use anacostia_engine::{
    NodeControlMsg, NodeCore, NodeKind, NodeName, SignalResult, Status, Trap, WorkTag,
    control::WAIT_POLL_INTERVAL,
};
use tracing::{error, info, instrument};

/// A resource node: one per backing store a pipeline watches. Brokers
/// between the metadata-store (its sole predecessor) and the action nodes
/// downstream (its successors).
pub struct ResourceNode<H: ResourceHooks> {
    core: NodeCore,
    hooks: H,
    monitoring: bool,
}

impl<H: ResourceHooks> ResourceNode<H> {
    /// Builds a new resource node. `monitoring` enables the background
    /// watcher and the `trigger_condition` busy-loop; disable it for
    /// resources only ever driven by an explicit upstream signal.
    #[must_use]
    pub fn new(name: NodeName, hooks: H, monitoring: bool) -> (Self, Sender<NodeControlMsg>) {
        let (core, control_tx) = NodeCore::new(name, NodeKind::Resource);
        (
            Self {
                core,
                hooks,
                monitoring,
            },
            control_tx,
        )
    }

    /// Mutable access to the shared node core, for pipeline wiring.
    pub fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    /// Shared node core.
    #[must_use]
    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    /// The resource's hooks, for the pipeline and RPC callee surface to
    /// reach `list_artifacts`/`get_artifact`/etc.
    #[must_use]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Drives the resource node's monitoring loop to completion.
    #[instrument(skip(self), fields(node = %self.core.name))]
    pub async fn run(&mut self) {
        self.core.status.set(Status::Init);

        if self.monitoring {
            if let Err(err) = self.hooks.record_current().await {
                error!(%err, "record_current failed during setup");
            }
            if let Err(err) = self.hooks.start_monitoring().await {
                error!(%err, "start_monitoring failed");
            }
        }

        self.core.status.set(Status::Running);

        'outer: loop {
            if self.core.trap_interrupts().await == Trap::Exiting {
                break;
            }

            if self.monitoring {
                let _tag = self.core.work.track(WorkTag::MonitoringResource);
                loop {
                    if self.core.trap_interrupts().await == Trap::Exiting {
                        break 'outer;
                    }
                    match self.hooks.trigger_condition().await {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(err) => error!(%err, "trigger_condition hook failed, retrying"),
                    }
                    tokio::time::sleep(WAIT_POLL_INTERVAL).await;
                }
            }

            self.core.signal_predecessors(SignalResult::Success);
            if self.core.wait_for_predecessors(SignalResult::Success).await == Trap::Exiting {
                break;
            }

            self.core.status.set(Status::Running);
            self.core.signal_successors(SignalResult::Success);
            if self.core.wait_for_successors(SignalResult::Success).await == Trap::Exiting {
                break;
            }

            self.core.signal_predecessors(SignalResult::Success);
            if self.core.wait_for_predecessors(SignalResult::Success).await == Trap::Exiting {
                break;
            }

            info!("run round complete");
        }

        if self.monitoring {
            if let Err(err) = self.hooks.stop_monitoring().await {
                error!(%err, "stop_monitoring failed");
            }
        }
        self.core.status.set(Status::Exited);
        info!("resource node exited");
    }
}
