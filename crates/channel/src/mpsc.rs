// SPDX-License-Identifier: Apache-2.0

//! Multiple-producer, single-consumer channel used to reach a node on its
//! dedicated thread.
//!
//! Used by the engine crate's control-message plumbing: a node's run loop
//! owns the [`Receiver`] half and polls it from `trap_interrupts` on the
//! node's own thread, while the pipeline's driver thread holds the
//! [`Sender`] half and delivers pause/resume/terminate messages across that
//! thread boundary without blocking. Both handles are therefore `Send`;
//! internal state is guarded by a `parking_lot::Mutex` rather than a
//! `RefCell`. Control messages are polled, never awaited, so the channel
//! only needs `send`/`try_recv`, not an async `Sink`/`Stream` pair.

use crate::error::{RecvError, SendError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct ChannelState<T> {
    buffer: VecDeque<T>,
    capacity: usize,
    is_closed: bool,
    senders: usize,
    has_receiver: bool,
}

/// A multi-producer, single-consumer channel that may cross a thread
/// boundary between construction and use.
pub struct Channel<T> {
    state: Mutex<ChannelState<T>>,
}

impl<T> Channel<T> {
    /// Creates a new channel with the given capacity.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new(capacity: usize) -> (Sender<T>, Receiver<T>) {
        let channel = Arc::new(Channel {
            state: Mutex::new(ChannelState {
                buffer: VecDeque::with_capacity(capacity),
                capacity,
                is_closed: false,
                senders: 1,
                has_receiver: true,
            }),
        });

        (
            Sender {
                channel: channel.clone(),
            },
            Receiver { channel },
        )
    }
}

/// A sender for the channel.
pub struct Sender<T> {
    channel: Arc<Channel<T>>,
}

/// A receiver for the channel.
pub struct Receiver<T> {
    channel: Arc<Channel<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.channel.state.lock().senders += 1;
        Sender {
            channel: self.channel.clone(),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        let mut state = self.channel.state.lock();
        state.senders -= 1;
        if state.senders == 0 {
            state.is_closed = true;
        }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        let mut state = self.channel.state.lock();
        state.has_receiver = false;
        state.is_closed = true;
    }
}

impl<T> Sender<T> {
    /// Sends a value to the channel without blocking. Fails if the channel
    /// is closed or at capacity.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let mut state = self.channel.state.lock();

        if state.is_closed || !state.has_receiver {
            return Err(SendError::Closed(value));
        }

        if state.buffer.len() >= state.capacity {
            return Err(SendError::Full(value));
        }

        state.buffer.push_back(value);
        Ok(())
    }
}

impl<T> Receiver<T> {
    /// Tries to receive a value from the channel without blocking.
    pub fn try_recv(&self) -> Result<T, RecvError> {
        let mut state = self.channel.state.lock();

        if let Some(value) = state.buffer.pop_front() {
            Ok(value)
        } else if state.is_closed {
            Err(RecvError::Closed)
        } else {
            Err(RecvError::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_then_try_recv_in_order() {
        let (tx, rx) = Channel::new(2);

        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
        assert!(matches!(rx.try_recv(), Err(RecvError::Empty)));
    }

    #[test]
    fn send_fails_once_capacity_is_reached() {
        let (tx, _rx) = Channel::new(1);

        tx.send(1).unwrap();
        match tx.send(2) {
            Err(SendError::Full(2)) => (),
            _ => panic!("expected Full error"),
        }
    }

    #[test]
    fn multiple_senders_preserve_send_order() {
        let (tx1, rx) = Channel::new(4);
        let tx2 = tx1.clone();

        tx1.send(1).unwrap();
        tx2.send(2).unwrap();

        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
    }

    #[test]
    fn dropping_the_last_sender_closes_the_channel() {
        let (tx, rx) = Channel::new(1);

        tx.send(1).unwrap();
        drop(tx);

        // Buffered value is still delivered.
        assert_eq!(rx.try_recv().unwrap(), 1);
        // Once drained, the close is visible.
        assert!(matches!(rx.try_recv(), Err(RecvError::Closed)));
    }

    #[test]
    fn dropping_the_receiver_fails_further_sends() {
        let (tx, rx) = Channel::new(1);
        drop(rx);

        match tx.send(1) {
            Err(SendError::Closed(1)) => (),
            _ => panic!("expected Closed error"),
        }
    }
}
