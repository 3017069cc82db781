// SPDX-License-Identifier: Apache-2.0

//! Wires and runs a demonstration pipeline: a metadata-store, a
//! filesystem-backed resource, and one action node, served over the admin
//! HTTP surface until the process receives SIGINT.

use anacostia_action::{ActionNode, FnAction};
use anacostia_config::PipelineConfig;
use anacostia_engine::HookError;
use anacostia_metadata::{MetadataStore, MetadataStoreNode, NoopMetadataStoreHooks};
use anacostia_pipeline::{NodeEntry, Pipeline, PipelineNode};
use anacostia_resource::{FilesystemResource, ResourceNode};
use anacostia_server::{AppState, RootServer};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Anacostia: a DAG of long-lived nodes coordinating over predecessor/successor signals.
#[derive(Parser, Debug)]
#[command(name = "anacostia", version, about)]
struct Cli {
    /// Address the admin HTTP server binds to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory the demonstration resource node watches for artifacts.
    #[arg(long, default_value = "./anacostia-data")]
    data_dir: PathBuf,

    /// Optional pipeline configuration file, validated and logged at startup.
    /// Node construction in this binary is fixed; a config-driven factory is
    /// future work, but the schema is exercised here.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        match PipelineConfig::from_file(path) {
            Ok(cfg) => tracing::info!(nodes = cfg.nodes.len(), edges = cfg.edges.len(), "loaded pipeline configuration"),
            Err(err) => {
                tracing::error!(%err, "failed to load pipeline configuration");
                return ExitCode::FAILURE;
            }
        }
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "anacostia exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = MetadataStore::new();
    let mut app_state = AppState {
        metadata: store.clone(),
        ..AppState::default()
    };

    let mut entries = Vec::new();

    let (metadata_node, metadata_ctrl) = MetadataStoreNode::new("metadata_store".into(), store.clone(), NoopMetadataStoreHooks);
    app_state.nodes.register(
        metadata_node.core().name.clone(),
        metadata_node.core().kind,
        metadata_node.core().status.clone(),
        metadata_node.core().work.clone(),
        Vec::new(),
    );
    entries.push(NodeEntry::new(
        Box::new(metadata_node) as Box<dyn PipelineNode>,
        metadata_ctrl,
        Vec::new(),
    ));

    let resource_backend = Arc::new(FilesystemResource::new("images".into(), &cli.data_dir, store.clone())?);
    app_state.resources.register(resource_backend.resource_name().clone(), resource_backend.clone());

    let (resource_node, resource_ctrl) = ResourceNode::new("images".into(), resource_backend, true);
    app_state.nodes.register(
        resource_node.core().name.clone(),
        resource_node.core().kind,
        resource_node.core().status.clone(),
        resource_node.core().work.clone(),
        vec!["metadata_store".into()],
    );
    entries.push(NodeEntry::new(
        Box::new(resource_node) as Box<dyn PipelineNode>,
        resource_ctrl,
        vec!["metadata_store".into()],
    ));

    let action = FnAction::new(|| async {
        tracing::info!("training action executing");
        Ok::<bool, HookError>(true)
    });
    let (action_node, action_ctrl) = ActionNode::new("train".into(), action);
    app_state.nodes.register(
        action_node.core().name.clone(),
        action_node.core().kind,
        action_node.core().status.clone(),
        action_node.core().work.clone(),
        vec!["images".into()],
    );
    entries.push(NodeEntry::new(
        Box::new(action_node) as Box<dyn PipelineNode>,
        action_ctrl,
        vec!["images".into()],
    ));

    let mut pipeline = Pipeline::build(entries)?;
    pipeline.launch()?;

    tracing::info!(order = ?pipeline.order(), "pipeline launched");

    let server = RootServer::new(app_state);
    server.serve(cli.bind, pipeline).await?;
    Ok(())
}
