// SPDX-License-Identifier: Apache-2.0

//! Node runtime: status machine, signal mailboxes, work-tag tracking, and
//! the cooperative `trap_interrupts` check every run loop is built from.
//!
//! This crate defines the machinery shared by every node kind. The node
//! kinds themselves — metadata-store, resource, action — live in their own
//! crates and are built around [`handle::NodeCore`].

/// Control messages and the `trap_interrupts` cooperative-yield check.
pub mod control;
/// Error types for the node runtime.
pub mod error;
/// [`handle::NodeCore`], the shared runtime state every node kind embeds.
pub mod handle;
/// Node identity and classification.
pub mod node;
/// The signal bus: per-node mailboxes and the signal record they hold.
pub mod signal;
/// The node status machine.
pub mod status;
/// Work-tag tracking for observability.
pub mod work;

pub use control::{NodeControlMsg, Trap};
pub use error::{Error, HookError};
pub use handle::NodeCore;
pub use node::{NodeKind, NodeName};
pub use signal::{Signal, SignalResult, SignalTable};
pub use status::{SharedStatus, Status};
pub use work::{WorkGuard, WorkList, WorkTag};
