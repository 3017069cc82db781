// SPDX-License-Identifier: Apache-2.0

//! Runs a node's run loop on a dedicated OS thread, each with its own
//! single-threaded Tokio runtime and `LocalSet`.
//!
//! A node never shares a runtime with any other node: its hooks are built
//! with `async_trait(?Send)` so the run loop's future is never required to
//! be `Send`, even though the node value itself is (see
//! [`crate::node_trait::PipelineNode`]). Only the `Arc`-backed handles
//! ([`anacostia_engine::SignalTable`], [`anacostia_engine::SharedStatus`],
//! the control channel) cross thread boundaries.

use crate::error::Error;
use std::future::Future;
use std::thread;
use tokio::runtime::Builder as RtBuilder;
use tokio::task::LocalSet;

/// Handle to a node's dedicated thread. Dropping this without calling
/// [`NodeThreadHandle::join`] detaches the thread; the pipeline always
/// joins every handle during `terminate`.
pub struct NodeThreadHandle {
    join_handle: Option<thread::JoinHandle<()>>,
    name: String,
}

impl NodeThreadHandle {
    /// Blocks until the node's thread returns. The node itself decides when
    /// to return from its run loop, in response to a `Terminate` control
    /// message observed at its next `trap_interrupts` check.
    pub fn join(mut self) -> Result<(), Error> {
        match self.join_handle.take().expect("join handle missing").join() {
            Ok(()) => Ok(()),
            Err(panic) => Err(Error::ThreadJoinPanic {
                thread_name: self.name.clone(),
                panic_message: format!("{panic:?}"),
            }),
        }
    }
}

/// Spawns `task_factory`'s future on a dedicated OS thread running a
/// current-thread Tokio runtime plus a `LocalSet`, so `!Send` futures can
/// run without boxing or requiring a multi-threaded runtime.
pub fn spawn_node_thread<F, Fut>(thread_name: impl Into<String>, task_factory: F) -> Result<NodeThreadHandle, Error>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let name = thread_name.into();
    let name_for_thread = name.clone();

    let join_handle = thread::Builder::new()
        .name(name_for_thread)
        .spawn(move || {
            let rt = RtBuilder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build per-node tokio runtime");
            let local = LocalSet::new();
            rt.block_on(local.run_until(task_factory()));
        })
        .map_err(|source| Error::ThreadSpawnError {
            thread_name: name.clone(),
            source,
        })?;

    Ok(NodeThreadHandle {
        join_handle: Some(join_handle),
        name,
    })
}
