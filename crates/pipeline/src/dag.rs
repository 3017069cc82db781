// SPDX-License-Identifier: Apache-2.0

//! Cycle detection and topological ordering over the predecessor edges a
//! pipeline is built from.

use crate::error::Error;
use anacostia_engine::NodeName;
use std::collections::{HashMap, HashSet};

/// Derives each node's successor list by inverting its declared
/// predecessors, and validates the result is acyclic.
///
/// `predecessors` maps each node to the names it declared as predecessors.
/// Returns `(successors, topo_order)` on success, where `topo_order` lists
/// every node such that each node appears after all of its predecessors.
pub fn build_successors_and_order(
    predecessors: &HashMap<NodeName, Vec<NodeName>>,
) -> Result<(HashMap<NodeName, Vec<NodeName>>, Vec<NodeName>), Error> {
    for (node, preds) in predecessors {
        for pred in preds {
            if !predecessors.contains_key(pred) {
                return Err(Error::UnknownPredecessor {
                    node: node.clone(),
                    predecessor: pred.clone(),
                });
            }
        }
    }

    let mut successors: HashMap<NodeName, Vec<NodeName>> =
        predecessors.keys().map(|name| (name.clone(), Vec::new())).collect();
    for (node, preds) in predecessors {
        for pred in preds {
            successors.entry(pred.clone()).or_default().push(node.clone());
        }
    }

    if let Some(cycle) = detect_cycle(&successors) {
        return Err(Error::CycleDetected { cycle });
    }

    Ok((successors.clone(), topological_order(predecessors, &successors)))
}

/// DFS cycle detection over the successor adjacency, tracking the nodes
/// currently on the recursion stack so a back-edge can be reported as the
/// exact cycle found.
fn detect_cycle(successors: &HashMap<NodeName, Vec<NodeName>>) -> Option<Vec<NodeName>> {
    fn visit(
        node: &NodeName,
        successors: &HashMap<NodeName, Vec<NodeName>>,
        visiting: &mut HashSet<NodeName>,
        visited: &mut HashSet<NodeName>,
        current_path: &mut Vec<NodeName>,
    ) -> Option<Vec<NodeName>> {
        if visited.contains(node) {
            return None;
        }
        if visiting.contains(node) {
            let pos = current_path.iter().position(|n| n == node)?;
            return Some(current_path[pos..].to_vec());
        }

        let _ = visiting.insert(node.clone());
        current_path.push(node.clone());

        if let Some(next) = successors.get(node) {
            for succ in next {
                if let Some(cycle) = visit(succ, successors, visiting, visited, current_path) {
                    return Some(cycle);
                }
            }
        }

        let _ = visiting.remove(node);
        let _ = visited.insert(node.clone());
        let _ = current_path.pop();
        None
    }

    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    let mut current_path = Vec::new();

    for node in successors.keys() {
        if let Some(cycle) = visit(node, successors, &mut visiting, &mut visited, &mut current_path) {
            return Some(cycle);
        }
    }
    None
}

/// Kahn's algorithm over the predecessor counts, assuming the graph has
/// already been confirmed acyclic.
fn topological_order(
    predecessors: &HashMap<NodeName, Vec<NodeName>>,
    successors: &HashMap<NodeName, Vec<NodeName>>,
) -> Vec<NodeName> {
    let mut remaining: HashMap<NodeName, usize> = predecessors
        .iter()
        .map(|(name, preds)| (name.clone(), preds.len()))
        .collect();

    let mut ready: Vec<NodeName> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| name.clone())
        .collect();
    ready.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    let mut order = Vec::with_capacity(predecessors.len());
    let mut queue = std::collections::VecDeque::from(ready);

    while let Some(node) = queue.pop_front() {
        order.push(node.clone());
        if let Some(next) = successors.get(&node) {
            let mut newly_ready = Vec::new();
            for succ in next {
                if let Some(count) = remaining.get_mut(succ) {
                    *count -= 1;
                    if *count == 0 {
                        newly_ready.push(succ.clone());
                    }
                }
            }
            newly_ready.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            for n in newly_ready {
                queue.push_back(n);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(pairs: &[(&str, &[&str])]) -> HashMap<NodeName, Vec<NodeName>> {
        pairs
            .iter()
            .map(|(name, p)| ((*name).into(), p.iter().map(|s| (*s).into()).collect()))
            .collect()
    }

    #[test]
    fn topo_order_places_every_node_after_its_predecessors() {
        let predecessors = preds(&[
            ("metadata", &[]),
            ("images", &["metadata"]),
            ("train", &["images"]),
        ]);
        let (_successors, order) = build_successors_and_order(&predecessors).expect("acyclic");
        let pos = |n: &str| order.iter().position(|x| x.as_str() == n).unwrap();
        assert!(pos("metadata") < pos("images"));
        assert!(pos("images") < pos("train"));
    }

    #[test]
    fn cycle_is_rejected() {
        let predecessors = preds(&[("a", &["b"]), ("b", &["a"])]);
        let err = build_successors_and_order(&predecessors).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
    }

    #[test]
    fn unknown_predecessor_is_rejected() {
        let predecessors = preds(&[("a", &["ghost"])]);
        let err = build_successors_and_order(&predecessors).unwrap_err();
        assert!(matches!(err, Error::UnknownPredecessor { .. }));
    }
}
