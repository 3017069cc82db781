// SPDX-License-Identifier: Apache-2.0

//! The node status machine.
//!
//! ```text
//! OFF -> INIT (setup succeeded) -> RUNNING <-> WAITING
//!                                 RUNNING -> PAUSING -> PAUSED -> RUNNING
//!                                 any     -> EXITING -> EXITED
//!                                 setup fails -> ERROR (terminal)
//! ```

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A node's current lifecycle state, as described by the status machine above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not yet started.
    Off,
    /// `setup()` succeeded; about to enter the run loop.
    Init,
    /// Actively executing the run loop.
    Running,
    /// Blocked in a `wait_for_*` step of the run loop.
    Waiting,
    /// A pause was requested; the node is unwinding to a safe point.
    Pausing,
    /// Paused; spinning on a short sleep until resumed.
    Paused,
    /// An exit was requested; running `on_exit` before terminating.
    Exiting,
    /// Terminated; the worker has returned.
    Exited,
    /// `setup()` failed. Terminal: the node never enters the run loop.
    Error,
}

impl Status {
    /// Returns `true` for the two terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Status::Exited | Status::Error)
    }
}

impl fmt::Display for Status {
    /// Renders the lowercase form used by `GET /status` and the dashboard
    /// JSON snapshot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Off => "off",
            Status::Init => "init",
            Status::Running => "running",
            Status::Waiting => "waiting",
            Status::Pausing => "pausing",
            Status::Paused => "paused",
            Status::Exiting => "exiting",
            Status::Exited => "exited",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

/// Shared, lock-guarded status cell. Cloning shares the same underlying
/// state: the pipeline's view and the node's own view are always the same
/// cell, so a pause/terminate request is visible to the node without any
/// message passing.
#[derive(Clone)]
pub struct SharedStatus(Arc<Mutex<Status>>);

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new(Status::Off)
    }
}

impl SharedStatus {
    /// Creates a new shared status cell initialized to `initial`.
    #[must_use]
    pub fn new(initial: Status) -> Self {
        Self(Arc::new(Mutex::new(initial)))
    }

    /// Returns the current status.
    #[must_use]
    pub fn get(&self) -> Status {
        *self.0.lock()
    }

    /// Unconditionally sets the status.
    pub fn set(&self, status: Status) {
        *self.0.lock() = status;
    }

    /// Requests a pause. No-op if the node is already pausing, paused, or
    /// in a terminal state; the caller never blocks on this call.
    pub fn request_pause(&self) {
        let mut guard = self.0.lock();
        if matches!(*guard, Status::Running | Status::Waiting) {
            *guard = Status::Pausing;
        }
    }

    /// Requests a resume from `PAUSED`. No-op otherwise.
    pub fn request_resume(&self) {
        let mut guard = self.0.lock();
        if *guard == Status::Paused {
            *guard = Status::Running;
        }
    }

    /// Requests termination. No-op if already terminal; the caller never
    /// blocks on this call.
    pub fn request_exit(&self) {
        let mut guard = self.0.lock();
        if !guard.is_terminal() {
            *guard = Status::Exiting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_pause_is_ignored_when_already_terminal() {
        let status = SharedStatus::new(Status::Exited);
        status.request_pause();
        assert_eq!(status.get(), Status::Exited);
    }

    #[test]
    fn request_exit_is_idempotent() {
        let status = SharedStatus::new(Status::Running);
        status.request_exit();
        assert_eq!(status.get(), Status::Exiting);
        status.request_exit();
        assert_eq!(status.get(), Status::Exiting);
    }

    #[test]
    fn resume_only_applies_from_paused() {
        let status = SharedStatus::new(Status::Running);
        status.request_resume();
        assert_eq!(status.get(), Status::Running);

        status.set(Status::Paused);
        status.request_resume();
        assert_eq!(status.get(), Status::Running);
    }
}
