// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration.
//!
//! Data model:
//! - a pipeline
//!   - nodes, keyed by id, each a [`node::NodeUserConfig`]
//!   - edges wiring nodes into a directed acyclic graph
//!
//! Loaded from YAML (or JSON) via [`pipeline::PipelineConfig::from_file`],
//! validated at parse time: every edge must reference a known node, the
//! graph must be acyclic, and exactly one node must be a `metadata_store`.
//! Building the actual [`anacostia_pipeline::Pipeline`] from a parsed config
//! is the caller's job, since it requires each node's setup code to
//! interpret its own `config` value.

pub mod error;
pub mod kind;
pub mod node;
pub mod pipeline;

pub use error::Error;
pub use kind::NodeKind;
pub use node::NodeUserConfig;
pub use pipeline::{Edge, PipelineConfig};
