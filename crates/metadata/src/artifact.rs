// SPDX-License-Identifier: Apache-2.0

//! The artifact entry record a resource node registers with the
//! metadata-store and the three-state lifecycle it moves through.

use anacostia_engine::NodeName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an artifact entry sits in its new -> current -> old lifecycle.
/// Transitions only ever move forward; the engine never moves an entry
/// backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactState {
    /// Observed by the resource node but not yet part of a run.
    New,
    /// The snapshot successors are currently working against.
    Current,
    /// Superseded by a newer `Current` entry.
    Old,
}

impl ArtifactState {
    /// The state this entry becomes when the metadata-store closes a run:
    /// `current` entries age into `old`, `new` entries are promoted to
    /// `current`. `old` stays `old`.
    #[must_use]
    pub fn advance_on_run_end(self) -> ArtifactState {
        match self {
            ArtifactState::New => ArtifactState::Current,
            ArtifactState::Current => ArtifactState::Old,
            ArtifactState::Old => ArtifactState::Old,
        }
    }
}

/// A single artifact registered by a resource node and persisted by the
/// metadata-store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Monotonically increasing primary key, assigned by the metadata-store.
    pub id: u64,
    /// The resource node that owns this entry.
    pub resource: NodeName,
    /// Run this entry belongs to; `None` until a run has claimed it.
    pub run_id: Option<u64>,
    /// Location within the resource's backing store (e.g. a file path).
    pub location: String,
    /// Current lifecycle state.
    pub state: ArtifactState,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry's run ended, if it has.
    pub end_time: Option<DateTime<Utc>>,
}
