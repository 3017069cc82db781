// SPDX-License-Identifier: Apache-2.0

//! [`ActionNode`]: runs user logic once per round and reports the outcome
//! to both predecessors and successors.

use crate::hooks::ActionHooks;
use anacostia_channel::mpsc::Sender;
use anacostia_engine::{NodeControlMsg, NodeCore, NodeKind, NodeName, SignalResult, Status, Trap, WorkTag};
use tracing::{error, info, instrument};

/// An action node: the leaves (and internal steps) of the DAG that do the
/// pipeline's actual work.
pub struct ActionNode<H: ActionHooks> {
    core: NodeCore,
    hooks: H,
}

impl<H: ActionHooks> ActionNode<H> {
    /// Builds a new action node.
    #[must_use]
    pub fn new(name: NodeName, hooks: H) -> (Self, Sender<NodeControlMsg>) {
        let (core, control_tx) = NodeCore::new(name, NodeKind::Action);
        (Self { core, hooks }, control_tx)
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

    /// Drives the action node's run loop to completion.
    #[instrument(skip(self), fields(node = %self.core.name))]
    pub async fn run(&mut self) {
        self.core.status.set(Status::Init);
        self.core.status.set(Status::Running);

        loop {
            if self.core.trap_interrupts().await == Trap::Exiting {
                break;
            }

            if self.core.wait_for_predecessors(SignalResult::Success).await == Trap::Exiting {
                break;
            }
            self.core.status.set(Status::Running);

            {
                let _tag = self.core.work.track(WorkTag::BeforeExecution);
                if let Err(err) = self.hooks.before_execution().await {
                    error!(%err, "before_execution hook failed");
                }
            }

            let ret = {
                let _tag = self.core.work.track(WorkTag::Execution);
                match self.hooks.execute().await {
                    Ok(ret) => ret,
                    Err(err) => {
                        let _tag = self.core.work.track(WorkTag::OnError);
                        if let Err(nested) = self.hooks.on_error(&err).await {
                            error!(%nested, original = %err, "on_error hook itself failed");
                        } else {
                            error!(%err, "execute failed");
                        }
                        false
                    }
                }
            };

            if ret {
                let _tag = self.core.work.track(WorkTag::OnSuccess);
                if let Err(err) = self.hooks.on_success().await {
                    error!(%err, "on_success hook failed");
                }
            } else {
                let _tag = self.core.work.track(WorkTag::OnFailure);
                if let Err(err) = self.hooks.on_failure().await {
                    error!(%err, "on_failure hook failed");
                }
            }

            {
                let _tag = self.core.work.track(WorkTag::AfterExecution);
                if let Err(err) = self.hooks.after_execution().await {
                    error!(%err, "after_execution hook failed");
                }
            }

            let result = if ret { SignalResult::Success } else { SignalResult::Failure };
            self.core.signal_successors(result);
            if self.core.wait_for_successors(SignalResult::Success).await == Trap::Exiting {
                break;
            }
            self.core.signal_predecessors(result);

            info!(success = ret, "round complete");
        }

        self.core.status.set(Status::Exited);
        info!("action node exited");
    }
}
