// SPDX-License-Identifier: Apache-2.0

//! Wires metadata-store, resource, and action nodes into a DAG, launches one
//! OS thread per node, and drives pause/resume/terminate across the graph.

pub mod dag;
pub mod error;
pub mod model;
pub mod node_trait;
pub mod pipeline;
pub mod thread_task;

pub use error::Error;
pub use model::{NodeModel, PipelineModel};
pub use node_trait::PipelineNode;
pub use pipeline::{NodeEntry, Pipeline};
pub use thread_task::{NodeThreadHandle, spawn_node_thread};
