// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios driving a real [`Pipeline`]: one OS thread per node,
//! genuine signal round-trips, no mocked scheduler.

use anacostia_action::{ActionNode, FnAction};
use anacostia_engine::{HookError, NodeName, Status};
use anacostia_metadata::{ArtifactEntryInput, ArtifactState, MetadataStore, MetadataStoreNode, NoopMetadataStoreHooks};
use anacostia_pipeline::{NodeEntry, Pipeline, PipelineNode};
use anacostia_resource::{ResourceHooks, ResourceNode};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A resource hook whose `trigger_condition` fires exactly once, so a
/// pipeline built on top of it runs exactly one round then idles.
struct OneShotResource {
    armed: Arc<AtomicBool>,
}

impl OneShotResource {
    fn new() -> (Self, Arc<AtomicBool>) {
        let armed = Arc::new(AtomicBool::new(true));
        (Self { armed: armed.clone() }, armed)
    }
}

#[async_trait(?Send)]
impl ResourceHooks for OneShotResource {
    async fn record_new(&self, _location: &str) -> Result<(), HookError> {
        Ok(())
    }

    async fn trigger_condition(&self) -> Result<bool, HookError> {
        Ok(self.armed.swap(false, Ordering::SeqCst))
    }

    async fn get_num_artifacts(&self, _state: ArtifactState) -> Result<usize, HookError> {
        Ok(0)
    }

    async fn list_artifacts(&self, _state: ArtifactState) -> Result<Vec<String>, HookError> {
        Ok(Vec::new())
    }

    async fn get_artifact(&self, _location: &str) -> Result<Vec<u8>, HookError> {
        Ok(Vec::new())
    }

    async fn load_artifact(&self, _location: &str) -> Result<Vec<u8>, HookError> {
        Ok(Vec::new())
    }

    async fn save_artifact(&self, _location: &str, _bytes: &[u8]) -> Result<(), HookError> {
        Ok(())
    }
}

/// A resource hook that never fires on its own; every round is triggered by
/// an explicit call to [`ResourceHooks::record_new`] never happening here —
/// used only as a drivable idle backend for the pause/resume scenario.
struct AlwaysReadyResource;

#[async_trait(?Send)]
impl ResourceHooks for AlwaysReadyResource {
    async fn record_new(&self, _location: &str) -> Result<(), HookError> {
        Ok(())
    }

    async fn get_num_artifacts(&self, _state: ArtifactState) -> Result<usize, HookError> {
        Ok(0)
    }

    async fn list_artifacts(&self, _state: ArtifactState) -> Result<Vec<String>, HookError> {
        Ok(Vec::new())
    }

    async fn get_artifact(&self, _location: &str) -> Result<Vec<u8>, HookError> {
        Ok(Vec::new())
    }

    async fn load_artifact(&self, _location: &str) -> Result<Vec<u8>, HookError> {
        Ok(Vec::new())
    }

    async fn save_artifact(&self, _location: &str, _bytes: &[u8]) -> Result<(), HookError> {
        Ok(())
    }
}

async fn poll_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn single_run_happy_path_promotes_the_watcher_recorded_entry_to_current() {
    let store = MetadataStore::new();
    let resource_name: NodeName = "images".into();
    store.register_resource(resource_name.clone());
    // Simulates the watcher recording a fresh file before the run that will
    // claim it even opens: the entry starts with no run id at all.
    let _ = store.merge_artifacts_table(
        resource_name.clone(),
        vec![ArtifactEntryInput {
            location: "x.txt".into(),
            state: ArtifactState::New,
            run_id: None,
        }],
    );

    let ran = Arc::new(AtomicUsize::new(0));
    let ran_for_action = ran.clone();

    let (metadata_node, metadata_ctrl) = MetadataStoreNode::new("metadata_store".into(), store.clone(), NoopMetadataStoreHooks);
    let (resource_hooks, _armed) = OneShotResource::new();
    let (resource_node, resource_ctrl) = ResourceNode::new("images".into(), resource_hooks, true);
    let (action_node, action_ctrl) = ActionNode::new(
        "train".into(),
        FnAction::new(move || {
            let ran = ran_for_action.clone();
            async move {
                let _ = ran.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, HookError>(true)
            }
        }),
    );

    let entries = vec![
        NodeEntry::new(Box::new(metadata_node) as Box<dyn PipelineNode>, metadata_ctrl, Vec::new()),
        NodeEntry::new(Box::new(resource_node) as Box<dyn PipelineNode>, resource_ctrl, vec!["metadata_store".into()]),
        NodeEntry::new(Box::new(action_node) as Box<dyn PipelineNode>, action_ctrl, vec!["images".into()]),
    ];

    let mut pipeline = Pipeline::build(entries).expect("pipeline builds");
    pipeline.launch().expect("pipeline launches");

    let settled = poll_until(Duration::from_secs(5), || {
        ran.load(Ordering::SeqCst) >= 1 && store.get_entries(&resource_name, ArtifactState::Current).len() == 1
    })
    .await;
    assert!(settled, "run never closed: action ran {} times", ran.load(Ordering::SeqCst));

    assert_eq!(ran.load(Ordering::SeqCst), 1, "action must run exactly once for the one triggered round");
    assert_eq!(store.run_id(), 1, "run id must advance exactly once");
    assert!(store.get_entries(&resource_name, ArtifactState::New).is_empty());

    pipeline.terminate().expect("pipeline terminates");
}

#[tokio::test(flavor = "multi_thread")]
async fn one_resource_fans_out_to_two_action_successors() {
    let store = MetadataStore::new();
    let resource_name: NodeName = "images".into();
    store.register_resource(resource_name.clone());

    let (metadata_node, metadata_ctrl) = MetadataStoreNode::new("metadata_store".into(), store.clone(), NoopMetadataStoreHooks);
    let (resource_hooks, _armed) = OneShotResource::new();
    let (resource_node, resource_ctrl) = ResourceNode::new("images".into(), resource_hooks, true);

    let train_ran = Arc::new(AtomicUsize::new(0));
    let evaluate_ran = Arc::new(AtomicUsize::new(0));

    let train_counter = train_ran.clone();
    let (train_node, train_ctrl) = ActionNode::new(
        "train".into(),
        FnAction::new(move || {
            let counter = train_counter.clone();
            async move {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, HookError>(true)
            }
        }),
    );

    let evaluate_counter = evaluate_ran.clone();
    let (evaluate_node, evaluate_ctrl) = ActionNode::new(
        "evaluate".into(),
        FnAction::new(move || {
            let counter = evaluate_counter.clone();
            async move {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, HookError>(true)
            }
        }),
    );

    let entries = vec![
        NodeEntry::new(Box::new(metadata_node) as Box<dyn PipelineNode>, metadata_ctrl, Vec::new()),
        NodeEntry::new(Box::new(resource_node) as Box<dyn PipelineNode>, resource_ctrl, vec!["metadata_store".into()]),
        NodeEntry::new(Box::new(train_node) as Box<dyn PipelineNode>, train_ctrl, vec!["images".into()]),
        NodeEntry::new(Box::new(evaluate_node) as Box<dyn PipelineNode>, evaluate_ctrl, vec!["images".into()]),
    ];

    let mut pipeline = Pipeline::build(entries).expect("pipeline builds");
    pipeline.launch().expect("pipeline launches");

    let settled = poll_until(Duration::from_secs(5), || {
        train_ran.load(Ordering::SeqCst) >= 1 && evaluate_ran.load(Ordering::SeqCst) >= 1
    })
    .await;
    assert!(settled, "not every successor ran: train={}, evaluate={}", train_ran.load(Ordering::SeqCst), evaluate_ran.load(Ordering::SeqCst));

    assert_eq!(train_ran.load(Ordering::SeqCst), 1);
    assert_eq!(evaluate_ran.load(Ordering::SeqCst), 1);
    assert_eq!(store.run_id(), 1);

    pipeline.terminate().expect("pipeline terminates");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_failing_action_still_closes_the_run() {
    let store = MetadataStore::new();
    let resource_name: NodeName = "images".into();
    store.register_resource(resource_name.clone());

    let (metadata_node, metadata_ctrl) = MetadataStoreNode::new("metadata_store".into(), store.clone(), NoopMetadataStoreHooks);
    let (resource_hooks, _armed) = OneShotResource::new();
    let (resource_node, resource_ctrl) = ResourceNode::new("images".into(), resource_hooks, true);

    let ran = Arc::new(AtomicUsize::new(0));
    let ran_for_action = ran.clone();
    let (action_node, action_ctrl) = ActionNode::new(
        "train".into(),
        FnAction::new(move || {
            let ran = ran_for_action.clone();
            async move {
                let _ = ran.fetch_add(1, Ordering::SeqCst);
                Ok::<bool, HookError>(false)
            }
        }),
    );

    let entries = vec![
        NodeEntry::new(Box::new(metadata_node) as Box<dyn PipelineNode>, metadata_ctrl, Vec::new()),
        NodeEntry::new(Box::new(resource_node) as Box<dyn PipelineNode>, resource_ctrl, vec!["metadata_store".into()]),
        NodeEntry::new(Box::new(action_node) as Box<dyn PipelineNode>, action_ctrl, vec!["images".into()]),
    ];

    let mut pipeline = Pipeline::build(entries).expect("pipeline builds");
    pipeline.launch().expect("pipeline launches");

    let settled = poll_until(Duration::from_secs(5), || store.run_id() >= 1).await;
    assert!(settled, "run never closed after the action reported failure");
    assert_eq!(ran.load(Ordering::SeqCst), 1, "the failing action must still have run exactly once");

    pipeline.terminate().expect("pipeline terminates");
}

#[tokio::test(flavor = "multi_thread")]
async fn pause_moves_every_node_to_paused_and_resume_brings_them_back() {
    let store = MetadataStore::new();
    let resource_name: NodeName = "images".into();
    store.register_resource(resource_name.clone());

    let (metadata_node, metadata_ctrl) = MetadataStoreNode::new("metadata_store".into(), store.clone(), NoopMetadataStoreHooks);
    let (resource_node, resource_ctrl) = ResourceNode::new("images".into(), AlwaysReadyResource, false);
    let (action_node, action_ctrl) = ActionNode::new(
        "train".into(),
        FnAction::new(|| async { Ok::<bool, HookError>(true) }),
    );

    let entries = vec![
        NodeEntry::new(Box::new(metadata_node) as Box<dyn PipelineNode>, metadata_ctrl, Vec::new()),
        NodeEntry::new(Box::new(resource_node) as Box<dyn PipelineNode>, resource_ctrl, vec!["metadata_store".into()]),
        NodeEntry::new(Box::new(action_node) as Box<dyn PipelineNode>, action_ctrl, vec!["images".into()]),
    ];

    let mut pipeline = Pipeline::build(entries).expect("pipeline builds");
    pipeline.launch().expect("pipeline launches");

    // Let at least one round run so every node is past its `Init` phase.
    tokio::time::sleep(Duration::from_millis(100)).await;

    pipeline.pause();
    let paused = poll_until(Duration::from_secs(5), || {
        pipeline.model().nodes.iter().all(|n| n.status == Status::Paused)
    })
    .await;
    assert!(paused, "not every node reached paused: {:?}", pipeline.model().nodes.iter().map(|n| (n.name.clone(), n.status)).collect::<Vec<_>>());

    pipeline.resume();
    let resumed = poll_until(Duration::from_secs(5), || {
        pipeline.model().nodes.iter().all(|n| n.status != Status::Paused && n.status != Status::Pausing)
    })
    .await;
    assert!(resumed, "not every node left paused after resume");

    pipeline.terminate().expect("pipeline terminates");
}
