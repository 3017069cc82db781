// SPDX-License-Identifier: Apache-2.0

//! Errors for the config crate.

/// Errors that can occur while loading or validating a [`crate::pipeline::PipelineConfig`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A collection of errors found while validating the configuration.
    #[error("invalid configuration: {0:?}")]
    InvalidConfiguration(Vec<Error>),

    /// Reading the configuration file failed.
    #[error("failed to read '{path}': {details}")]
    FileReadError {
        /// The path that failed to read.
        path: String,
        /// Human-readable I/O failure details.
        details: String,
    },

    /// Deserializing the configuration failed.
    #[error("{format} deserialization error: {details}")]
    DeserializationError {
        /// The format that failed to parse ("JSON" or "YAML").
        format: String,
        /// Human-readable parse failure details.
        details: String,
    },

    /// The file extension did not match a supported format.
    #[error("unsupported file extension '{extension}', expected .json, .yaml, or .yml")]
    UnsupportedExtension {
        /// The extension found on the path.
        extension: String,
    },

    /// An edge referenced a node id that has no entry in `nodes`.
    #[error("edge references unknown node '{node}'")]
    UnknownEdgeNode {
        /// The missing node id.
        node: String,
    },

    /// The node graph contains a cycle.
    #[error("cycle detected involving nodes: {nodes:?}")]
    CycleDetected {
        /// The node ids on the cycle.
        nodes: Vec<String>,
    },

    /// The pipeline did not declare exactly one metadata-store node.
    #[error("pipeline must have exactly one metadata_store node, found {found}")]
    WrongMetadataStoreCount {
        /// How many metadata-store nodes were found.
        found: usize,
    },
}
