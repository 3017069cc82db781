// SPDX-License-Identifier: Apache-2.0

//! Errors raised while constructing or driving a pipeline.

use anacostia_engine::NodeName;

/// Errors that can occur while building or running a pipeline.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Two nodes were registered under the same name.
    #[error("duplicate node name '{name}'")]
    DuplicateNodeName {
        /// The repeated name.
        name: NodeName,
    },

    /// A node named one of its predecessors but that predecessor was never
    /// registered.
    #[error("node '{node}' names unknown predecessor '{predecessor}'")]
    UnknownPredecessor {
        /// The node with the dangling reference.
        node: NodeName,
        /// The name it referenced.
        predecessor: NodeName,
    },

    /// The dependency graph is not acyclic.
    #[error("cycle detected among nodes: {cycle:?}")]
    CycleDetected {
        /// The nodes forming the cycle, in traversal order.
        cycle: Vec<NodeName>,
    },

    /// A pipeline must have exactly one metadata-store node.
    #[error("pipeline must have exactly one metadata-store node, found {found}")]
    WrongMetadataStoreCount {
        /// How many metadata-store nodes were registered.
        found: usize,
    },

    /// Failed to spawn the dedicated OS thread for a node.
    #[error("failed to spawn thread '{thread_name}': {source}")]
    ThreadSpawnError {
        /// Name of the thread that failed to spawn.
        thread_name: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A node's thread panicked instead of returning.
    #[error("thread for node '{thread_name}' panicked: {panic_message}")]
    ThreadJoinPanic {
        /// Name of the thread that panicked.
        thread_name: String,
        /// The panic payload, formatted for display.
        panic_message: String,
    },

    /// A control message could not be delivered to a node.
    #[error(transparent)]
    Control(#[from] anacostia_engine::Error),
}
