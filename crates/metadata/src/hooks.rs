// SPDX-License-Identifier: Apache-2.0

//! The run-lifecycle hooks a concrete metadata-store backend overrides.
//!
//! Everything else the metadata-store node needs — entry bookkeeping, run id
//! tracking, metrics/params/tags — is owned outright by
//! [`crate::store::MetadataStore`]; only the four lifecycle notifications
//! below are left for a backend (SQL, a model registry) to plug into.

use anacostia_engine::HookError;
use async_trait::async_trait;

/// Notifications a metadata-store backend can act on. The default,
/// no-op implementation is enough to run a pipeline entirely in memory.
#[async_trait(?Send)]
pub trait MetadataStoreHooks {
    /// Called once a new run id has been claimed, before any successor is
    /// signalled. A backend typically opens its run record here.
    async fn start_run(&self, _run_id: u64) -> Result<(), HookError> {
        Ok(())
    }

    /// Called immediately after `start_run`, to persist the run id a backend
    /// assigned (e.g. an MLflow run UUID) alongside the engine's own counter.
    /// Stamping `run_id` onto the store's own open entries is engine-owned
    /// (`MetadataStore::stamp_open_entries`) and happens independently of
    /// this hook.
    async fn add_run_id(&self, _run_id: u64) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once every successor has reported the run complete, before
    /// `end_run`.
    async fn add_end_time(&self, _run_id: u64) -> Result<(), HookError> {
        Ok(())
    }

    /// Called to close out the run record after entry states have been
    /// advanced.
    async fn end_run(&self, _run_id: u64) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once when the node is terminating, after its last run (if
    /// any) has closed. Errors are logged and otherwise ignored.
    async fn on_exit(&self) -> Result<(), HookError> {
        Ok(())
    }
}

/// A backend that does nothing: every entry and run-id assignment lives
/// only in the engine-owned [`crate::store::MetadataStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetadataStoreHooks;

#[async_trait(?Send)]
impl MetadataStoreHooks for NoopMetadataStoreHooks {}
