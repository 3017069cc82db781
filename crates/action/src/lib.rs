// SPDX-License-Identifier: Apache-2.0

//! The action node: runs user logic once per round, between a round of
//! predecessor signals and a round of successor signals.

/// A closure-based [`hooks::ActionHooks`] adapter.
pub mod fn_action;
/// The user-overridable action capabilities.
pub mod hooks;
/// [`node::ActionNode`], the execute-and-report run loop.
pub mod node;

pub use fn_action::FnAction;
pub use hooks::ActionHooks;
pub use node::ActionNode;
