// SPDX-License-Identifier: Apache-2.0

//! The default [`ResourceHooks`] backend: a directory tree on local disk,
//! watched with `notify` and backed by the shared
//! [`anacostia_metadata::MetadataStore`].

use crate::hooks::ResourceHooks;
use anacostia_engine::{HookError, NodeName};
use anacostia_metadata::{ArtifactEntryInput, ArtifactState, MetadataStore};
use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Watches `root` for filesystem changes and registers every new file as an
/// artifact entry owned by `resource`.
pub struct FilesystemResource {
    resource: NodeName,
    root: PathBuf,
    store: MetadataStore,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FilesystemResource {
    /// Builds a resource rooted at `root`, creating the directory if it
    /// does not already exist.
    pub fn new(resource: NodeName, root: impl Into<PathBuf>, store: MetadataStore) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        store.register_resource(resource.clone());
        Ok(Self {
            resource,
            root,
            store,
            watcher: Mutex::new(None),
        })
    }

    /// Full path backing `location`.
    #[must_use]
    pub fn resolve(&self, location: &str) -> PathBuf {
        self.root.join(location)
    }

    fn relative_location(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .map(|rel| rel.to_string_lossy().replace('\\', "/"))
    }

    /// The node this resource backs.
    #[must_use]
    pub fn resource_name(&self) -> &NodeName {
        &self.resource
    }

    /// Plain (non-`async_trait`) counterpart of [`ResourceHooks::get_num_artifacts`].
    /// Exists so the HTTP resource callee gets a genuinely `Send` future
    /// instead of the `?Send`-boxed one the trait method returns, since the
    /// callee runs on the admin server's ordinary multi-threaded runtime.
    #[must_use]
    pub fn num_artifacts(&self, state: ArtifactState) -> usize {
        self.store.get_num_entries(&self.resource, state)
    }

    /// `Send` counterpart of [`ResourceHooks::list_artifacts`].
    #[must_use]
    pub fn artifact_locations(&self, state: ArtifactState) -> Vec<String> {
        self.store
            .get_entries(&self.resource, state)
            .into_iter()
            .map(|entry| entry.location)
            .collect()
    }

    /// `Send` counterpart of [`ResourceHooks::load_artifact`], reading
    /// through an advisory shared lock.
    pub async fn read_artifact(&self, location: &str) -> std::io::Result<Vec<u8>> {
        crate::lock::with_shared_lock(self.resolve(location), std::fs::read).await
    }

    /// Registers `location` (already written to disk by the caller, e.g. the
    /// streaming upload callee) as a fresh artifact.
    pub fn register_uploaded(&self, location: String) {
        let _ = self.store.merge_artifacts_table(
            self.resource.clone(),
            vec![ArtifactEntryInput {
                location,
                state: ArtifactState::New,
                run_id: None,
            }],
        );
    }
}

#[async_trait(?Send)]
impl ResourceHooks for FilesystemResource {
    async fn start_monitoring(&self) -> Result<(), HookError> {
        let root = self.root.clone();
        // `notify`'s callback runs on its own background thread; every path
        // it touches (`store`, `resource`) is `Send + Sync`, so no hand-off
        // back onto this node's thread is needed.
        let resource = self.resource.clone();
        let store = self.store.clone();
        let relative = move |path: &Path| -> Option<String> {
            path.strip_prefix(&root).ok().map(|rel| rel.to_string_lossy().replace('\\', "/"))
        };
        let root_for_watch = self.root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!(%err, "resource watcher error, continuing");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            for path in event.paths {
                if !path.is_file() {
                    continue;
                }
                let Some(location) = relative(&path) else {
                    continue;
                };
                let _ = store.merge_artifacts_table(
                    resource.clone(),
                    vec![ArtifactEntryInput {
                        location,
                        state: ArtifactState::New,
                        run_id: None,
                    }],
                );
            }
        })
        .map_err(|err| HookError::from_source("failed to start filesystem watcher", err))?;

        watcher
            .watch(&root_for_watch, RecursiveMode::Recursive)
            .map_err(|err| HookError::from_source("failed to watch resource root", err))?;

        *self.watcher.lock() = Some(watcher);
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<(), HookError> {
        *self.watcher.lock() = None;
        Ok(())
    }

    async fn record_new(&self, location: &str) -> Result<(), HookError> {
        let _ = self.store.merge_artifacts_table(
            self.resource.clone(),
            vec![ArtifactEntryInput {
                location: location.to_string(),
                state: ArtifactState::New,
                run_id: None,
            }],
        );
        Ok(())
    }

    async fn record_current(&self) -> Result<(), HookError> {
        let entries = walk_files(&self.root).map_err(|err| HookError::from_source("failed to walk resource root", err))?;
        let inputs = entries
            .into_iter()
            .filter_map(|path| self.relative_location(&path))
            .map(|location| ArtifactEntryInput {
                location,
                state: ArtifactState::Current,
                run_id: None,
            })
            .collect();
        let _ = self.store.merge_artifacts_table(self.resource.clone(), inputs);
        Ok(())
    }

    async fn get_num_artifacts(&self, state: ArtifactState) -> Result<usize, HookError> {
        Ok(self.num_artifacts(state))
    }

    async fn list_artifacts(&self, state: ArtifactState) -> Result<Vec<String>, HookError> {
        Ok(self.artifact_locations(state))
    }

    async fn get_artifact(&self, location: &str) -> Result<Vec<u8>, HookError> {
        self.load_artifact(location).await
    }

    async fn load_artifact(&self, location: &str) -> Result<Vec<u8>, HookError> {
        self.read_artifact(location)
            .await
            .map_err(|err| HookError::from_source(format!("failed to read artifact '{location}'"), err))
    }

    async fn save_artifact(&self, location: &str, bytes: &[u8]) -> Result<(), HookError> {
        let path = self.resolve(location);
        if path.exists() {
            return Err(HookError::new(format!("artifact '{location}' already exists")));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| HookError::from_source("failed to create artifact parent directory", err))?;
        }
        let bytes = bytes.to_vec();
        crate::lock::with_exclusive_lock(path, move |file| {
            use std::io::Write;
            file.write_all(&bytes)
        })
        .await
        .map_err(|err| HookError::from_source(format!("failed to write artifact '{location}'"), err))
    }
}

fn walk_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    Ok(out)
}
