// SPDX-License-Identifier: Apache-2.0

//! The user-overridable capabilities a resource node is built from.

use anacostia_engine::HookError;
use anacostia_metadata::ArtifactState;
use async_trait::async_trait;
use std::sync::Arc;

/// The backing-store operations a resource node delegates to. A resource
/// node never touches its backing store directly — every artifact access
/// goes through one of these, so a concrete implementation (filesystem,
/// object store, database table) only needs to answer these ten questions.
#[async_trait(?Send)]
pub trait ResourceHooks {
    /// Starts any background watcher needed to observe changes to the
    /// backing store. A no-op if monitoring isn't enabled for this node.
    async fn start_monitoring(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Stops the background watcher started by `start_monitoring`.
    async fn stop_monitoring(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Records a freshly observed artifact at `location` in state `new`.
    /// Called by the watcher whenever the backing store changes, and by the
    /// run loop to seed entries discovered before monitoring started.
    async fn record_new(&self, location: &str) -> Result<(), HookError>;

    /// Re-registers artifacts already present in the backing store as
    /// `current`, typically on first startup before any run has happened.
    async fn record_current(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Evaluated in a busy-loop while monitoring is enabled; `true` means
    /// conditions are met to start a run. Defaults to always-ready.
    async fn trigger_condition(&self) -> Result<bool, HookError> {
        Ok(true)
    }

    /// Number of artifacts currently in `state`.
    async fn get_num_artifacts(&self, state: ArtifactState) -> Result<usize, HookError>;

    /// Locations of artifacts currently in `state`.
    async fn list_artifacts(&self, state: ArtifactState) -> Result<Vec<String>, HookError>;

    /// Reads the raw bytes of the artifact at `location`, regardless of
    /// lifecycle state. Used by the RPC callee's streaming download.
    async fn get_artifact(&self, location: &str) -> Result<Vec<u8>, HookError>;

    /// Reads the raw bytes of the artifact at `location` for use by a
    /// downstream action node. Distinguished from `get_artifact` so a
    /// backend can apply different caching for action-facing reads.
    async fn load_artifact(&self, location: &str) -> Result<Vec<u8>, HookError>;

    /// Writes `bytes` to `location`, creating parent directories as needed.
    /// Must reject an existing `location` rather than overwrite it.
    async fn save_artifact(&self, location: &str, bytes: &[u8]) -> Result<(), HookError>;
}

/// Lets a resource node share ownership of its backend with something else
/// that needs the same hooks outside the node's own thread — e.g. the HTTP
/// server's resource RPC callee holding the same `Arc<FilesystemResource>`.
#[async_trait(?Send)]
impl<T: ResourceHooks + ?Sized> ResourceHooks for Arc<T> {
    async fn start_monitoring(&self) -> Result<(), HookError> {
        T::start_monitoring(self).await
    }

    async fn stop_monitoring(&self) -> Result<(), HookError> {
        T::stop_monitoring(self).await
    }

    async fn record_new(&self, location: &str) -> Result<(), HookError> {
        T::record_new(self, location).await
    }

    async fn record_current(&self) -> Result<(), HookError> {
        T::record_current(self).await
    }

    async fn trigger_condition(&self) -> Result<bool, HookError> {
        T::trigger_condition(self).await
    }

    async fn get_num_artifacts(&self, state: ArtifactState) -> Result<usize, HookError> {
        T::get_num_artifacts(self, state).await
    }

    async fn list_artifacts(&self, state: ArtifactState) -> Result<Vec<String>, HookError> {
        T::list_artifacts(self, state).await
    }

    async fn get_artifact(&self, location: &str) -> Result<Vec<u8>, HookError> {
        T::get_artifact(self, location).await
    }

    async fn load_artifact(&self, location: &str) -> Result<Vec<u8>, HookError> {
        T::load_artifact(self, location).await
    }

    async fn save_artifact(&self, location: &str, bytes: &[u8]) -> Result<(), HookError> {
        T::save_artifact(self, location, bytes).await
    }
}
