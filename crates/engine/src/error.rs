// SPDX-License-Identifier: Apache-2.0

//! Error types for the node runtime.

use crate::node::NodeName;
use std::error::Error as StdError;

/// Errors raised by the node runtime itself, as opposed to user hook code
/// (see [`HookError`]).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A control message could not be delivered because the node's control
    /// channel is closed (the node has already exited).
    #[error("control channel for node '{node}' is closed")]
    ControlChannelClosed {
        /// The node the message was addressed to.
        node: NodeName,
    },
}

/// A failure raised by user-supplied hook code (`setup`, `execute`, and the
/// rest of the capability traits in `anacostia-metadata`/`-resource`/
/// `-action`).
///
/// Hook failures are data, never panics: the run loop catches them, logs
/// them, and — outside of `setup`/`execute` — continues as if the hook had
/// returned successfully, per the per-node isolation policy.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl HookError {
    /// Builds a hook error from a plain message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a hook error wrapping an underlying cause.
    #[must_use]
    pub fn from_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
