// SPDX-License-Identifier: Apache-2.0

//! The metadata-store's engine-owned bookkeeping: run identity, artifact
//! entries, and the metrics/params/tags/trigger logs attached to a run.
//!
//! These operations are not user-overridable hooks — they are the core
//! coordination state the spec places in scope, as distinct from a concrete
//! persistence backend (SQL, a model registry) which is out of scope and
//! would sit behind [`crate::hooks::MetadataStoreHooks`] instead.

use crate::artifact::{ArtifactEntry, ArtifactState};
use anacostia_engine::NodeName;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// An artifact entry submitted to [`MetadataStore::merge_artifacts_table`],
/// before an `id` has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntryInput {
    /// Location within the resource's backing store.
    pub location: String,
    /// Lifecycle state to record.
    pub state: ArtifactState,
    /// Run this entry belongs to, if known yet.
    pub run_id: Option<u64>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<u64, ArtifactEntry>,
    next_entry_id: u64,
    run_id: u64,
    known_resources: HashSet<NodeName>,
    metrics: HashMap<(NodeName, u64), HashMap<String, f64>>,
    params: HashMap<(NodeName, u64), HashMap<String, String>>,
    tags: HashMap<(NodeName, u64), HashMap<String, String>>,
    triggers: Vec<TriggerLogEntry>,
}

/// A free-text note logged against a node for a given run.
#[derive(Debug, Clone)]
pub struct TriggerLogEntry {
    /// The node that logged the trigger.
    pub node: NodeName,
    /// The free-text message.
    pub message: String,
    /// When it was logged.
    pub logged_at: chrono::DateTime<Utc>,
}

/// The in-memory reference metadata store. Thread-safe: every operation
/// takes the single internal lock for the duration of the call and releases
/// it before returning, so it is safe to call concurrently from the
/// metadata-store node's run loop and from RPC callee handlers.
#[derive(Clone, Default)]
pub struct MetadataStore {
    inner: Arc<Mutex<Inner>>,
}

impl MetadataStore {
    /// Creates an empty store with `run_id` starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resource` as a known resource node, so `get_node_id` and
    /// entry-scoped queries can validate the name. Called once by each
    /// resource node during setup.
    pub fn register_resource(&self, resource: NodeName) {
        let _ = self.inner.lock().known_resources.insert(resource);
    }

    /// Returns `resource` back if it has been registered, confirming the
    /// metadata-store knows about it.
    #[must_use]
    pub fn get_node_id(&self, resource: &NodeName) -> Option<NodeName> {
        let inner = self.inner.lock();
        inner.known_resources.get(resource).cloned()
    }

    /// Current run id. Starts at 0; advances by exactly 1 each time
    /// [`MetadataStore::advance_run_id`] is called at the end of a run.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.inner.lock().run_id
    }

    /// Advances the run id by 1 and returns the new value. Called once per
    /// completed metadata-store cycle, after `end_run`.
    pub fn advance_run_id(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.run_id += 1;
        inner.run_id
    }

    /// Registers a new artifact entry and returns it.
    pub fn create_entry(
        &self,
        resource: NodeName,
        location: String,
        state: ArtifactState,
        run_id: Option<u64>,
    ) -> ArtifactEntry {
        let mut inner = self.inner.lock();
        let id = inner.next_entry_id;
        inner.next_entry_id += 1;
        let entry = ArtifactEntry {
            id,
            resource,
            run_id,
            location,
            state,
            created_at: Utc::now(),
            end_time: None,
        };
        let _ = inner.entries.insert(id, entry.clone());
        entry
    }

    /// `true` if `resource` already has an entry at `location`.
    #[must_use]
    pub fn entry_exists(&self, resource: &NodeName, location: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .entries
            .values()
            .any(|e| &e.resource == resource && e.location == location)
    }

    /// All entries owned by `resource` in the given `state`.
    #[must_use]
    pub fn get_entries(&self, resource: &NodeName, state: ArtifactState) -> Vec<ArtifactEntry> {
        let inner = self.inner.lock();
        inner
            .entries
            .values()
            .filter(|e| &e.resource == resource && e.state == state)
            .cloned()
            .collect()
    }

    /// Count of entries owned by `resource` in the given `state`.
    #[must_use]
    pub fn get_num_entries(&self, resource: &NodeName, state: ArtifactState) -> usize {
        self.get_entries(resource, state).len()
    }

    /// Inserts or updates entries for `resource`, deduplicating on
    /// `(resource, location)`. Idempotent: re-submitting the same entries
    /// leaves the store in the same state rather than creating duplicates.
    /// Returns the resulting entries, in submission order.
    pub fn merge_artifacts_table(
        &self,
        resource: NodeName,
        entries: Vec<ArtifactEntryInput>,
    ) -> Vec<ArtifactEntry> {
        let mut inner = self.inner.lock();
        let mut result = Vec::with_capacity(entries.len());
        for input in entries {
            let existing_id = inner
                .entries
                .values()
                .find(|e| e.resource == resource && e.location == input.location)
                .map(|e| e.id);

            let entry = if let Some(id) = existing_id {
                let entry = inner.entries.get_mut(&id).expect("entry id came from this map");
                entry.state = input.state;
                entry.run_id = input.run_id.or(entry.run_id);
                entry.clone()
            } else {
                let id = inner.next_entry_id;
                inner.next_entry_id += 1;
                let entry = ArtifactEntry {
                    id,
                    resource: resource.clone(),
                    run_id: input.run_id,
                    location: input.location,
                    state: input.state,
                    created_at: Utc::now(),
                    end_time: None,
                };
                let _ = inner.entries.insert(id, entry.clone());
                entry
            };
            result.push(entry);
        }
        result
    }

    /// Stamps `run_id` onto every entry that has no run yet (`run_id ==
    /// None`) — the open entries a resource node recorded since the last
    /// run closed. Called once when a run opens, before any successor is
    /// signalled, so `advance_all_entry_states` has a run id to match
    /// against when the run closes.
    pub fn stamp_open_entries(&self, run_id: u64) {
        let mut inner = self.inner.lock();
        for entry in inner.entries.values_mut() {
            if entry.run_id.is_none() {
                entry.run_id = Some(run_id);
            }
        }
    }

    /// Advances every entry's lifecycle state by one step: `current`
    /// entries become `old`, `new` entries become `current`. Called once
    /// when a run closes. `old` entries, and entries outside the current
    /// run, are left untouched.
    pub fn advance_all_entry_states(&self, run_id: u64) {
        let mut inner = self.inner.lock();
        let now = Utc::now();
        for entry in inner.entries.values_mut() {
            if entry.run_id == Some(run_id) && entry.state != ArtifactState::Old {
                entry.state = entry.state.advance_on_run_end();
                if entry.state == ArtifactState::Old {
                    entry.end_time = Some(now);
                }
            }
        }
    }

    /// Records metric values for `node` under `run_id`, merging with any
    /// values already logged.
    pub fn log_metrics(&self, node: NodeName, run_id: u64, kv: HashMap<String, f64>) {
        let mut inner = self.inner.lock();
        inner.metrics.entry((node, run_id)).or_default().extend(kv);
    }

    /// Records parameter values for `node` under `run_id`.
    pub fn log_params(&self, node: NodeName, run_id: u64, kv: HashMap<String, String>) {
        let mut inner = self.inner.lock();
        inner.params.entry((node, run_id)).or_default().extend(kv);
    }

    /// Sets tag values for `node` under `run_id`.
    pub fn set_tags(&self, node: NodeName, run_id: u64, kv: HashMap<String, String>) {
        let mut inner = self.inner.lock();
        inner.tags.entry((node, run_id)).or_default().extend(kv);
    }

    /// Returns the metrics logged for `node` under `run_id`.
    #[must_use]
    pub fn get_metrics(&self, node: &NodeName, run_id: u64) -> HashMap<String, f64> {
        self.inner
            .lock()
            .metrics
            .get(&(node.clone(), run_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the parameters logged for `node` under `run_id`.
    #[must_use]
    pub fn get_params(&self, node: &NodeName, run_id: u64) -> HashMap<String, String> {
        self.inner
            .lock()
            .params
            .get(&(node.clone(), run_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the tags set for `node` under `run_id`.
    #[must_use]
    pub fn get_tags(&self, node: &NodeName, run_id: u64) -> HashMap<String, String> {
        self.inner
            .lock()
            .tags
            .get(&(node.clone(), run_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Appends a free-text trigger note for `node`.
    pub fn log_trigger(&self, node: NodeName, message: String) {
        self.inner.lock().triggers.push(TriggerLogEntry {
            node,
            message,
            logged_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_artifacts_table_is_idempotent_on_resubmission() {
        let store = MetadataStore::new();
        let resource: NodeName = "images".into();
        let input = vec![ArtifactEntryInput {
            location: "x.txt".into(),
            state: ArtifactState::New,
            run_id: None,
        }];

        let first = store.merge_artifacts_table(resource.clone(), input.clone());
        let second = store.merge_artifacts_table(resource.clone(), input);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(store.get_num_entries(&resource, ArtifactState::New), 1);
    }

    #[test]
    fn advance_all_entry_states_never_moves_old_backwards() {
        let store = MetadataStore::new();
        let resource: NodeName = "images".into();
        let entry = store.create_entry(resource.clone(), "a.bin".into(), ArtifactState::New, Some(0));

        store.advance_all_entry_states(0);
        assert_eq!(
            store.get_entries(&resource, ArtifactState::Current)[0].id,
            entry.id
        );

        store.advance_all_entry_states(0);
        let old = store.get_entries(&resource, ArtifactState::Old);
        assert_eq!(old.len(), 1);
        assert!(old[0].end_time.is_some());

        store.advance_all_entry_states(0);
        assert_eq!(store.get_num_entries(&resource, ArtifactState::Old), 1);
    }

    #[test]
    fn stamp_open_entries_claims_entries_recorded_before_the_run_opened() {
        let store = MetadataStore::new();
        let resource: NodeName = "images".into();
        let entry = store.merge_artifacts_table(
            resource.clone(),
            vec![ArtifactEntryInput {
                location: "x.txt".into(),
                state: ArtifactState::New,
                run_id: None,
            }],
        )[0]
            .clone();
        assert_eq!(entry.run_id, None);

        store.stamp_open_entries(0);
        store.advance_all_entry_states(0);

        let current = store.get_entries(&resource, ArtifactState::Current);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, entry.id);
    }

    #[test]
    fn run_id_advances_by_exactly_one() {
        let store = MetadataStore::new();
        assert_eq!(store.run_id(), 0);
        assert_eq!(store.advance_run_id(), 1);
        assert_eq!(store.run_id(), 1);
    }
}
