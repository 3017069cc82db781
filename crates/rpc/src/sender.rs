// SPDX-License-Identifier: Apache-2.0

//! [`RpcSenderNode`]: stands in for a remote node as the sole successor of
//! whatever local nodes feed it, forwarding signals over HTTP.

use crate::error::Error;
use crate::event::RpcEvent;
use anacostia_engine::control::{NodeControlMsg, Trap, WAIT_POLL_INTERVAL};
use anacostia_engine::{NodeCore, NodeKind, NodeName, SignalResult, WorkTag};
use anacostia_channel::mpsc::Sender as ControlSender;
use tracing::{instrument, warn};

/// Forwards local signals to a remote receiver's `/signal_leaf`, and relays
/// the remote's eventual `/signal_root` callback back to local
/// predecessors.
pub struct RpcSenderNode {
    core: NodeCore,
    client: reqwest::Client,
    receiver_base_url: String,
    /// Set by the `/signal_root` HTTP handler mounted alongside this node.
    pub signal_root: RpcEvent,
}

impl RpcSenderNode {
    /// Builds a sender node that will forward to `receiver_base_url`
    /// (e.g. `"http://leaf-host:8080/leaf-pipeline-id/receiver-name"`).
    #[must_use]
    pub fn new(
        name: NodeName,
        client: reqwest::Client,
        receiver_base_url: impl Into<String>,
    ) -> (Self, ControlSender<NodeControlMsg>) {
        let (core, control_tx) = NodeCore::new(name, NodeKind::RpcSender);
        (
            Self {
                core,
                client,
                receiver_base_url: receiver_base_url.into(),
                signal_root: RpcEvent::new(),
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

    async fn post_signal_leaf(&self) -> Result<(), Error> {
        let url = format!("{}/signal_leaf", self.receiver_base_url);
        let response = self
            .client
            .post(&url)
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

    /// Drives the node: wait on local predecessors, forward to the remote
    /// receiver, wait on the remote's callback, relay it back locally.
    #[instrument(skip(self), fields(node = %self.core.name))]
    pub async fn run(&mut self) {
        loop {
            if self.core.trap_interrupts().await == Trap::Exiting {
                return;
            }

            if self.core.wait_for_predecessors(SignalResult::Success).await == Trap::Exiting {
                return;
            }

            let result = match self.post_signal_leaf().await {
                Ok(()) => SignalResult::Success,
                Err(err) => {
                    warn!(%err, "failed to forward signal to remote receiver");
                    SignalResult::Failure
                }
            };
            if result == SignalResult::Failure {
                self.core.signal_predecessors(SignalResult::Failure);
                continue;
            }

            let remote_result = {
                let _tag = self.core.work.track(WorkTag::WaitingSuccessors);
                loop {
                    if self.core.trap_interrupts().await == Trap::Exiting {
                        return;
                    }
                    if let Some(result) = self.signal_root.take() {
                        break result;
                    }
                    tokio::time::sleep(WAIT_POLL_INTERVAL).await;
                }
            };

            self.core.signal_predecessors(remote_result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_root_event_unblocks_the_relay_wait() {
        let event = RpcEvent::new();
        event.set(SignalResult::Success);
        assert_eq!(event.take(), Some(SignalResult::Success));
    }

    #[test]
    fn new_sender_starts_with_no_pending_signal() {
        let (node, _tx) = RpcSenderNode::new(
            "sender".into(),
            reqwest::Client::new(),
            "http://127.0.0.1:0",
        );
        assert!(node.signal_root.take().is_none());
        assert_eq!(node.core().name.as_str(), "sender");
    }
}
