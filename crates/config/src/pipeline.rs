// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration specification: a directed acyclic graph of nodes,
//! described declaratively so a pipeline can be assembled without
//! hand-written wiring code.

use crate::error::Error;
use crate::kind::NodeKind;
use crate::node::NodeUserConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A directed edge from a predecessor node to a successor node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Edge {
    /// The predecessor node id.
    pub from: String,
    /// The successor node id.
    pub to: String,
}

/// A pipeline configuration: every node keyed by id, plus the edges wiring
/// them into a DAG.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// All nodes in this pipeline, keyed by node id.
    pub nodes: HashMap<String, NodeUserConfig>,

    /// Predecessor-to-successor edges wiring the nodes into a DAG.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl PipelineConfig {
    /// Parses a [`PipelineConfig`] from a JSON string and validates it.
    pub fn from_json(json_str: &str) -> Result<Self, Error> {
        let cfg: PipelineConfig = serde_json::from_str(json_str).map_err(|e| Error::DeserializationError {
            format: "JSON".to_string(),
            details: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a [`PipelineConfig`] from a YAML string and validates it.
    pub fn from_yaml(yaml_str: &str) -> Result<Self, Error> {
        let cfg: PipelineConfig = serde_yaml::from_str(yaml_str).map_err(|e| Error::DeserializationError {
            format: "YAML".to_string(),
            details: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads a [`PipelineConfig`] from a file, detecting JSON vs. YAML from
    /// the file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);

        let contents = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;

        match extension.as_deref() {
            Some("json") => Self::from_json(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Err(Error::UnsupportedExtension {
                extension: extension.unwrap_or_else(|| "<none>".to_string()),
            }),
        }
    }

    /// Validates that every edge references a known node, the graph has no
    /// cycles, and the pipeline has exactly one `metadata_store` node.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();

        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.from) {
                errors.push(Error::UnknownEdgeNode { node: edge.from.clone() });
            }
            if !self.nodes.contains_key(&edge.to) {
                errors.push(Error::UnknownEdgeNode { node: edge.to.clone() });
            }
        }

        if errors.is_empty() {
            if let Some(cycle) = self.detect_cycle() {
                errors.push(Error::CycleDetected { nodes: cycle });
            }
        }

        let metadata_store_count = self.nodes.values().filter(|n| n.kind == NodeKind::MetadataStore).count();
        if metadata_store_count != 1 {
            errors.push(Error::WrongMetadataStoreCount {
                found: metadata_store_count,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidConfiguration(errors))
        }
    }

    fn successors(&self) -> HashMap<&str, Vec<&str>> {
        let mut out: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            out.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
        }
        out
    }

    /// Depth-first search for a cycle, returning the cycle's node ids if one
    /// exists.
    fn detect_cycle(&self) -> Option<Vec<String>> {
        fn visit<'a>(
            node: &'a str,
            successors: &HashMap<&'a str, Vec<&'a str>>,
            visiting: &mut HashSet<&'a str>,
            visited: &mut HashSet<&'a str>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            if visited.contains(node) {
                return None;
            }
            if visiting.contains(node) {
                let pos = path.iter().position(|n| *n == node).expect("node is on the path");
                return Some(path[pos..].iter().map(|s| s.to_string()).collect());
            }

            let _ = visiting.insert(node);
            path.push(node);

            if let Some(targets) = successors.get(node) {
                for target in targets {
                    if let Some(cycle) = visit(target, successors, visiting, visited, path) {
                        return Some(cycle);
                    }
                }
            }

            let _ = visiting.remove(node);
            let _ = visited.insert(node);
            let _ = path.pop();
            None
        }

        let successors = self.successors();
        let mut visiting = HashSet::new();
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        for node in self.nodes.keys() {
            if let Some(cycle) = visit(node, &successors, &mut visiting, &mut visited, &mut path) {
                return Some(cycle);
            }
        }
        None
    }

    /// Predecessors of `node`, derived from `edges`.
    #[must_use]
    pub fn predecessors_of(&self, node: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|e| e.to == node)
            .map(|e| e.from.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        "
nodes:
  store:
    kind: metadata_store
  images:
    kind: resource
  train:
    kind: action
edges:
  - from: images
    to: train
  - from: store
    to: images
"
    }

    #[test]
    fn parses_and_validates_a_minimal_pipeline() {
        let cfg = PipelineConfig::from_yaml(sample_yaml()).unwrap();
        assert_eq!(cfg.nodes.len(), 3);
        assert_eq!(cfg.predecessors_of("train"), vec!["images".to_string()]);
    }

    #[test]
    fn rejects_an_edge_to_an_unknown_node() {
        let yaml = "
nodes:
  store:
    kind: metadata_store
edges:
  - from: store
    to: ghost
";
        let err = PipelineConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_a_cycle() {
        let yaml = "
nodes:
  store:
    kind: metadata_store
  a:
    kind: action
  b:
    kind: action
edges:
  - from: a
    to: b
  - from: b
    to: a
";
        let err = PipelineConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_zero_or_multiple_metadata_stores() {
        let yaml = "
nodes:
  a:
    kind: action
";
        let err = PipelineConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn from_file_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "nodes: {}").unwrap();
        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension { .. }));
    }
}
