// SPDX-License-Identifier: Apache-2.0

//! HTTP admin surface for a running pipeline: per-node status/work
//! endpoints, RPC sender/receiver callees, resource artifact streaming, and
//! the metadata-store callee. Runs on an ordinary multi-threaded Tokio
//! runtime, separate from the single-thread-per-node runtimes
//! `anacostia_pipeline` drives the DAG on.

pub mod error;
pub mod leaf;
pub mod metadata_routes;
pub mod node_routes;
pub mod resource_routes;
pub mod root;
pub mod rpc_routes;
pub mod state;

pub use error::Error;
pub use leaf::LeafServer;
pub use root::RootServer;
pub use state::AppState;
