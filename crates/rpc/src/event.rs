// SPDX-License-Identifier: Apache-2.0

//! A one-slot mailbox an HTTP handler can fill and a node's run loop can
//! poll, mirroring [`anacostia_engine::SignalTable`]'s overwrite semantics
//! but crossing from the server's task pool into a node's dedicated thread
//! instead of between two nodes.

use anacostia_engine::SignalResult;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle set by a `/signal_root` or `/signal_leaf` HTTP handler and
/// drained by the owning node's run loop.
#[derive(Clone, Default)]
pub struct RpcEvent(Arc<Mutex<Option<SignalResult>>>);

impl RpcEvent {
    /// Creates an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the remote peer posted, overwriting any prior unread
    /// value. Called from the HTTP handler.
    pub fn set(&self, result: SignalResult) {
        *self.0.lock() = Some(result);
    }

    /// Takes the pending value, if any, clearing it.
    #[must_use]
    pub fn take(&self) -> Option<SignalResult> {
        self.0.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_event() {
        let event = RpcEvent::new();
        assert!(event.take().is_none());
        event.set(SignalResult::Success);
        assert_eq!(event.take(), Some(SignalResult::Success));
        assert!(event.take().is_none());
    }

    #[test]
    fn set_overwrites_an_unread_value() {
        let event = RpcEvent::new();
        event.set(SignalResult::Success);
        event.set(SignalResult::Failure);
        assert_eq!(event.take(), Some(SignalResult::Failure));
    }
}
