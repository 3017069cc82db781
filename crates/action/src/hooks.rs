// SPDX-License-Identifier: Apache-2.0

//! The user-overridable capabilities an action node is built from.

use anacostia_engine::HookError;
use async_trait::async_trait;

/// User logic run once per round. Only `execute` is required; the rest
/// default to no-ops so a minimal action only needs to implement the one
/// method that matters.
#[async_trait(?Send)]
pub trait ActionHooks {
    /// Runs before `execute`, once every predecessor has signalled.
    async fn before_execution(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// The action's actual work. `Ok(true)` reports success downstream,
    /// `Ok(false)` reports failure without treating it as a hook error.
    /// An `Err` is routed to `on_error` and treated as `Ok(false)`.
    async fn execute(&self) -> Result<bool, HookError>;

    /// Runs when `execute` returned `Ok(true)`.
    async fn on_success(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs when `execute` returned `Ok(false)` or errored.
    async fn on_failure(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs when `execute` itself errored, before `on_failure`.
    async fn on_error(&self, _error: &HookError) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs unconditionally after success/failure handling, whether or not
    /// `execute` errored.
    async fn after_execution(&self) -> Result<(), HookError> {
        Ok(())
    }
}
