// SPDX-License-Identifier: Apache-2.0

//! The signal bus: per-node mailboxes holding the latest signal from each
//! neighbour.
//!
//! A [`SignalTable`] is an overwrite mailbox, not a queue — see
//! [`SignalTable::put`] for why that choice matters.

use crate::node::NodeName;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The outcome carried by a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalResult {
    /// The sender completed its step successfully.
    Success,
    /// The sender's step failed; downstream should treat the round as failed.
    Failure,
}

/// An immutable ready/done record exchanged between direct DAG neighbours.
/// Signals are never forwarded past the neighbour that received them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Signal {
    /// Name of the node that sent this signal.
    pub sender: NodeName,
    /// Name of the node the signal was addressed to.
    pub receiver: NodeName,
    /// When the signal was sent.
    pub timestamp: DateTime<Utc>,
    /// The outcome the sender is reporting.
    pub result: SignalResult,
}

impl Signal {
    /// Builds a signal stamped with the current time.
    #[must_use]
    pub fn new(sender: NodeName, receiver: NodeName, result: SignalResult) -> Self {
        Self {
            sender,
            receiver,
            timestamp: Utc::now(),
            result,
        }
    }
}

/// A mutex-guarded mapping from neighbour name to that neighbour's latest
/// signal. Only the most recent signal per sender is retained.
#[derive(Clone, Default)]
pub struct SignalTable {
    mailbox: Arc<Mutex<HashMap<NodeName, Signal>>>,
}

impl SignalTable {
    /// Creates an empty signal table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any previous signal from `signal.sender` in this mailbox.
    ///
    /// Signals are edge-triggered readiness flags, not events to replay:
    /// queuing would let a slow consumer accumulate stale signals and
    /// misalign rounds, so each sender gets exactly one slot.
    pub fn put(&self, signal: Signal) {
        let mut mailbox = self.mailbox.lock();
        let _ = mailbox.insert(signal.sender.clone(), signal);
    }

    /// Returns `true` iff the mailbox holds exactly one entry per name in
    /// `expected_neighbours` and every one of them carries `required_result`.
    /// On `true`, the mailbox is cleared atomically under the same lock
    /// acquisition, so no caller can observe the same signal twice.
    pub fn check_all(&self, expected_neighbours: &[NodeName], required_result: SignalResult) -> bool {
        let mut mailbox = self.mailbox.lock();
        if expected_neighbours.is_empty() {
            return true;
        }
        let ready = expected_neighbours.iter().all(|name| {
            mailbox
                .get(name)
                .is_some_and(|signal| signal.result == required_result)
        });
        if ready {
            mailbox.clear();
        }
        ready
    }

    /// Returns the number of distinct senders currently holding a slot.
    /// Exposed for tests and observability; not part of the engine's
    /// synchronization contract.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mailbox.lock().len()
    }

    /// Returns `true` if no sender currently holds a slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mailbox.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(sender: &str, result: SignalResult) -> Signal {
        Signal::new(sender.into(), "receiver".into(), result)
    }

    #[test]
    fn check_all_requires_every_expected_neighbour() {
        let table = SignalTable::new();
        table.put(signal("a", SignalResult::Success));
        let expected: Vec<NodeName> = vec!["a".into(), "b".into()];
        assert!(!table.check_all(&expected, SignalResult::Success));

        table.put(signal("b", SignalResult::Success));
        assert!(table.check_all(&expected, SignalResult::Success));
    }

    #[test]
    fn check_all_clears_mailbox_atomically_on_success() {
        let table = SignalTable::new();
        table.put(signal("a", SignalResult::Success));
        let expected: Vec<NodeName> = vec!["a".into()];

        assert!(table.check_all(&expected, SignalResult::Success));
        assert!(table.is_empty());
        // A second check without a new put must not see stale success again.
        assert!(!table.check_all(&expected, SignalResult::Success));
    }

    #[test]
    fn put_overwrites_rather_than_queues() {
        let table = SignalTable::new();
        table.put(signal("a", SignalResult::Failure));
        table.put(signal("a", SignalResult::Success));
        assert_eq!(table.len(), 1);
        let expected: Vec<NodeName> = vec!["a".into()];
        assert!(table.check_all(&expected, SignalResult::Success));
    }

    #[test]
    fn mixed_results_do_not_satisfy_check_all() {
        let table = SignalTable::new();
        table.put(signal("a", SignalResult::Success));
        table.put(signal("b", SignalResult::Failure));
        let expected: Vec<NodeName> = vec!["a".into(), "b".into()];
        assert!(!table.check_all(&expected, SignalResult::Success));
        // Mailbox must be left intact since the check failed.
        assert_eq!(table.len(), 2);
    }
}
