// SPDX-License-Identifier: Apache-2.0

//! [`PipelineNode`]: the object-safe interface the pipeline drives every
//! node kind through, regardless of which hooks trait it was built with.

use anacostia_action::{ActionHooks, ActionNode};
use anacostia_engine::NodeCore;
use anacostia_metadata::{MetadataStoreHooks, MetadataStoreNode};
use anacostia_resource::{ResourceHooks, ResourceNode};
use anacostia_rpc::{RpcReceiverNode, RpcSenderNode};
use async_trait::async_trait;

/// A node the pipeline can wire, launch, and drive, independent of its
/// concrete hooks type.
///
/// `Send` is a supertrait (not a bound on `run`'s returned future) so that
/// `Box<dyn PipelineNode>` can be moved into the dedicated OS thread
/// [`crate::thread_task::spawn_node_thread`] spawns for it; the future
/// `run` returns is polled entirely on that thread afterwards and is never
/// itself required to be `Send`.
#[async_trait(?Send)]
pub trait PipelineNode: Send {
    /// Shared runtime state: name, kind, status, signal mailboxes.
    fn core(&self) -> &NodeCore;

    /// Mutable access, used only during pipeline construction to wire
    /// predecessor/successor signal tables.
    fn core_mut(&mut self) -> &mut NodeCore;

    /// Drives the node's run loop until an exit is requested.
    async fn run(&mut self);
}

#[async_trait(?Send)]
impl<H: MetadataStoreHooks + Send> PipelineNode for MetadataStoreNode<H> {
    fn core(&self) -> &NodeCore {
        MetadataStoreNode::core(self)
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        MetadataStoreNode::core_mut(self)
    }

    async fn run(&mut self) {
        MetadataStoreNode::run(self).await;
    }
}

#[async_trait(?Send)]
impl<H: ResourceHooks + Send> PipelineNode for ResourceNode<H> {
    fn core(&self) -> &NodeCore {
        ResourceNode::core(self)
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        ResourceNode::core_mut(self)
    }

    async fn run(&mut self) {
        ResourceNode::run(self).await;
    }
}

#[async_trait(?Send)]
impl<H: ActionHooks + Send> PipelineNode for ActionNode<H> {
    fn core(&self) -> &NodeCore {
        ActionNode::core(self)
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        ActionNode::core_mut(self)
    }

    async fn run(&mut self) {
        ActionNode::run(self).await;
    }
}

#[async_trait(?Send)]
impl PipelineNode for RpcSenderNode {
    fn core(&self) -> &NodeCore {
        RpcSenderNode::core(self)
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        RpcSenderNode::core_mut(self)
    }

    async fn run(&mut self) {
        RpcSenderNode::run(self).await;
    }
}

#[async_trait(?Send)]
impl PipelineNode for RpcReceiverNode {
    fn core(&self) -> &NodeCore {
        RpcReceiverNode::core(self)
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        RpcReceiverNode::core_mut(self)
    }

    async fn run(&mut self) {
        RpcReceiverNode::run(self).await;
    }
}
