// SPDX-License-Identifier: Apache-2.0

//! An [`ActionHooks`] adapter around a plain closure, for actions simple
//! enough not to warrant a dedicated type.

use crate::hooks::ActionHooks;
use anacostia_engine::HookError;
use async_trait::async_trait;
use std::future::Future;

/// Wraps a closure returning `Result<bool, HookError>` as an action with
/// no `before_execution`/`on_success`/etc. behavior.
pub struct FnAction<F> {
    execute: F,
}

impl<F, Fut> FnAction<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool, HookError>>,
{
    /// Wraps `execute` as an action.
    pub fn new(execute: F) -> Self {
        Self { execute }
    }
}

#[async_trait(?Send)]
impl<F, Fut> ActionHooks for FnAction<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool, HookError>>,
{
    async fn execute(&self) -> Result<bool, HookError> {
        (self.execute)().await
    }
}
