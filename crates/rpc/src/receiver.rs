// SPDX-License-Identifier: Apache-2.0

//! [`RpcReceiverNode`]: stands in for a remote node as the sole predecessor
//! of whatever local nodes it feeds, relaying signals over HTTP.

use crate::error::Error;
use crate::event::RpcEvent;
use anacostia_engine::control::{NodeControlMsg, Trap, WAIT_POLL_INTERVAL};
use anacostia_engine::{NodeCore, NodeKind, NodeName, SignalResult, WorkTag};
use anacostia_channel::mpsc::Sender as ControlSender;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Relays an upstream sender's `/signal_leaf` call into the local graph,
/// and reports the local outcome back to the sender's `/signal_root`.
pub struct RpcReceiverNode {
    core: NodeCore,
    client: reqwest::Client,
    sender_base_url: String,
    /// Opaque id identifying this leaf instance to the sender, assigned
    /// during the root/leaf handshake.
    leaf_pipeline_id: Uuid,
    /// Set by the `/signal_leaf` HTTP handler mounted alongside this node.
    pub signal_leaf: RpcEvent,
}

impl RpcReceiverNode {
    /// Builds a receiver node that will report back to `sender_base_url`
    /// (e.g. `"http://root-host:8080/sender-name"`).
    #[must_use]
    pub fn new(
        name: NodeName,
        client: reqwest::Client,
        sender_base_url: impl Into<String>,
        leaf_pipeline_id: Uuid,
    ) -> (Self, ControlSender<NodeControlMsg>) {
        let (core, control_tx) = NodeCore::new(name, NodeKind::RpcReceiver);
        (
            Self {
                core,
                client,
                sender_base_url: sender_base_url.into(),
                leaf_pipeline_id,
                signal_leaf: RpcEvent::new(),
            },
            control_tx,
        )
    }

    /// Shared runtime state.
    #[must_use]
    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    /// Mutable access, used during pipeline wiring.
    #[must_use]
    pub fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    /// The id this receiver was assigned during the handshake.
    #[must_use]
    pub fn leaf_pipeline_id(&self) -> Uuid {
        self.leaf_pipeline_id
    }

    async fn post_signal_root(&self) -> Result<(), Error> {
        let url = format!("{}/signal_root", self.sender_base_url);
        let response = self
            .client
            .post(&url)
            .header("X-Leaf-Pipeline-Id", self.leaf_pipeline_id.to_string())
            .send()
            .await
            .map_err(|source| Error::Request {
                url: url.clone(),
                source,
            })?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Status {
                url,
                status: response.status().as_u16(),
            })
        }
    }

    /// Drives the node: wait on the remote sender's callback, forward into
    /// the local graph, wait on local successors, report back.
    #[instrument(skip(self), fields(node = %self.core.name))]
    pub async fn run(&mut self) {
        loop {
            let remote_result = {
                let _tag = self.core.work.track(WorkTag::WaitingPredecessors);
                loop {
                    if self.core.trap_interrupts().await == Trap::Exiting {
                        return;
                    }
                    if let Some(result) = self.signal_leaf.take() {
                        break result;
                    }
                    tokio::time::sleep(WAIT_POLL_INTERVAL).await;
                }
            };

            self.core.signal_successors(remote_result);

            if self.core.wait_for_successors(SignalResult::Success).await == Trap::Exiting {
                return;
            }

            if let Err(err) = self.post_signal_root().await {
                warn!(%err, "failed to report signal back to remote sender");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_leaf_event_unblocks_the_forward_wait() {
        let event = RpcEvent::new();
        event.set(SignalResult::Success);
        assert_eq!(event.take(), Some(SignalResult::Success));
    }

    #[test]
    fn new_receiver_carries_its_assigned_leaf_id() {
        let id = Uuid::new_v4();
        let (node, _tx) = RpcReceiverNode::new(
            "receiver".into(),
            reqwest::Client::new(),
            "http://127.0.0.1:0",
            id,
        );
        assert_eq!(node.leaf_pipeline_id(), id);
    }
}
