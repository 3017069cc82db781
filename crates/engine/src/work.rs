// SPDX-License-Identifier: Apache-2.0

//! Work tags: short phase markers a node pushes/pops so external observers
//! (the `/work` HTTP endpoint) can see what a node is currently doing.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A phase a node can be in while servicing its run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkTag {
    /// Blocked in `wait_for_predecessors`.
    WaitingPredecessors,
    /// Blocked in `wait_for_successors`.
    WaitingSuccessors,
    /// A resource node blocked waiting on its backing store.
    WaitingResource,
    /// A resource node actively polling `trigger_condition`.
    MonitoringResource,
    /// About to call `execute`.
    BeforeExecution,
    /// Inside `execute`.
    Execution,
    /// Inside `on_success`.
    OnSuccess,
    /// Inside `on_failure`.
    OnFailure,
    /// Inside `on_error`.
    OnError,
    /// Inside `after_execution`.
    AfterExecution,
    /// The metadata-store node is starting a run.
    StartingRun,
    /// The metadata-store node is ending a run.
    EndingRun,
}

impl fmt::Display for WorkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkTag::WaitingPredecessors => "WAITING_PREDECESSORS",
            WorkTag::WaitingSuccessors => "WAITING_SUCCESSORS",
            WorkTag::WaitingResource => "WAITING_RESOURCE",
            WorkTag::MonitoringResource => "MONITORING_RESOURCE",
            WorkTag::BeforeExecution => "BEFORE_EXECUTION",
            WorkTag::Execution => "EXECUTION",
            WorkTag::OnSuccess => "ON_SUCCESS",
            WorkTag::OnFailure => "ON_FAILURE",
            WorkTag::OnError => "ON_ERROR",
            WorkTag::AfterExecution => "AFTER_EXECUTION",
            WorkTag::StartingRun => "STARTING_RUN",
            WorkTag::EndingRun => "ENDING_RUN",
        };
        f.write_str(s)
    }
}

/// The multiset of work tags a node currently holds, for observability only.
#[derive(Clone, Default)]
pub struct WorkList {
    tags: Arc<Mutex<Vec<WorkTag>>>,
}

impl WorkList {
    /// Creates an empty work list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `tag` and returns a guard that pops it again on `Drop`. Using
    /// the guard instead of a manual push/pop pair means a hook panic, an
    /// early return, or a `?` propagation can never leave a stale tag
    /// behind.
    #[must_use]
    pub fn track(&self, tag: WorkTag) -> WorkGuard<'_> {
        self.tags.lock().push(tag);
        WorkGuard { list: self, tag }
    }

    /// Returns a snapshot of the currently active tags, most-recently-pushed
    /// last.
    #[must_use]
    pub fn snapshot(&self) -> Vec<WorkTag> {
        self.tags.lock().clone()
    }
}

/// RAII guard returned by [`WorkList::track`]. Removes the first matching
/// tag from the list when dropped.
pub struct WorkGuard<'a> {
    list: &'a WorkList,
    tag: WorkTag,
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        let mut tags = self.list.tags.lock();
        if let Some(pos) = tags.iter().position(|t| *t == self.tag) {
            let _ = tags.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_pushes_and_drop_pops() {
        let list = WorkList::new();
        {
            let _guard = list.track(WorkTag::Execution);
            assert_eq!(list.snapshot(), vec![WorkTag::Execution]);
        }
        assert!(list.snapshot().is_empty());
    }

    #[test]
    fn nested_guards_pop_independently() {
        let list = WorkList::new();
        let outer = list.track(WorkTag::WaitingPredecessors);
        {
            let _inner = list.track(WorkTag::Execution);
            assert_eq!(
                list.snapshot(),
                vec![WorkTag::WaitingPredecessors, WorkTag::Execution]
            );
        }
        assert_eq!(list.snapshot(), vec![WorkTag::WaitingPredecessors]);
        drop(outer);
        assert!(list.snapshot().is_empty());
    }
}
