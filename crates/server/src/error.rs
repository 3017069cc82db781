// SPDX-License-Identifier: Apache-2.0

//! Errors raised while binding or running an admin HTTP server.

/// Errors raised by [`crate::root::RootServer::serve`] or
/// [`crate::leaf::LeafServer::serve`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The configured bind address could not be parsed.
    #[error("invalid bind address '{addr}': {details}")]
    InvalidBindAddress {
        /// The address string that failed to parse.
        addr: String,
        /// Human-readable parse failure details.
        details: String,
    },

    /// Binding the TCP listener failed.
    #[error("failed to bind admin server on '{addr}': {details}")]
    BindFailed {
        /// The address that failed to bind.
        addr: String,
        /// Human-readable bind failure details.
        details: String,
    },

    /// The server encountered a fatal I/O error while serving.
    #[error("admin server error on '{addr}': {details}")]
    ServeFailed {
        /// The address the server was bound to.
        addr: String,
        /// Human-readable failure details.
        details: String,
    },

    /// A leaf failed to respond to the root's registration handshake.
    #[error("handshake with leaf '{leaf_url}' failed: {source}")]
    HandshakeFailed {
        /// The leaf's base URL.
        leaf_url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Shutting the pipeline down after the server stopped failed.
    #[error("pipeline shutdown failed: {0}")]
    Terminate(#[from] anacostia_pipeline::Error),
}
