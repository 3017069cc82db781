// SPDX-License-Identifier: Apache-2.0

//! Errors raised delivering a signal across a sender/receiver pair.

/// A signal could not be delivered to (or acknowledged by) the remote peer.
///
/// Per the RPC failure semantics, this is never propagated as a hard error:
/// the caller logs it and treats the signal as [`anacostia_engine::SignalResult::Failure`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The outbound HTTP request itself failed (connection refused, DNS
    /// failure, timeout, TLS error, ...).
    #[error("request to '{url}' failed: {source}")]
    Request {
        /// The URL that was being requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The remote peer responded with a non-success status code.
    #[error("'{url}' responded with status {status}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },
}
