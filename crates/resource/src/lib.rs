// SPDX-License-Identifier: Apache-2.0

//! The resource node: watches a backing store, brokers a run round-trip
//! between the metadata-store and its downstream action nodes, and exposes
//! the artifact operations the RPC callee surface and action nodes read
//! from.

/// The default filesystem-backed [`hooks::ResourceHooks`] implementation.
pub mod filesystem;
/// The user-overridable resource capabilities.
pub mod hooks;
/// Advisory file locking shared by the filesystem backend and the HTTP callee.
pub mod lock;
/// [`node::ResourceNode`], the watch-and-broker run loop.
pub mod node;

pub use filesystem::FilesystemResource;
pub use hooks::ResourceHooks;
pub use node::ResourceNode;
