// SPDX-License-Identifier: Apache-2.0

//! The metadata-store RPC callee: every `MetadataStore` operation a remote
//! resource or action node needs, exposed as JSON-over-HTTP.

use crate::state::AppState;
use anacostia_metadata::{ArtifactEntry, ArtifactEntryInput, ArtifactState};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::collections::HashMap;

/// Mounted once per server, rooted at the metadata-store node's own path
/// segment by the caller (see [`crate::root::RootServer`]/[`crate::leaf::LeafServer`]).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/get_run_id", get(get_run_id))
        .route("/get_node_id", get(get_node_id))
        .route("/create_entry", get(create_entry))
        .route("/merge_artifacts_table", post(merge_artifacts_table))
        .route("/entry_exists", get(entry_exists))
        .route("/log_metrics", post(log_metrics))
        .route("/log_params", post(log_params))
        .route("/set_tags", post(set_tags))
        .route("/get_metrics", get(get_metrics))
        .route("/get_params", get(get_params))
        .route("/get_tags", get(get_tags))
        .route("/log_trigger", post(log_trigger))
        .route("/get_num_entries", get(get_num_entries))
        .route("/get_entries", get(get_entries))
}

async fn get_run_id(State(state): State<AppState>) -> Json<u64> {
    Json(state.metadata.run_id())
}

#[derive(Deserialize)]
struct NodeNameQuery {
    node_name: String,
}

async fn get_node_id(State(state): State<AppState>, Query(query): Query<NodeNameQuery>) -> Response {
    match state.metadata.get_node_id(&query.node_name.as_str().into()) {
        Some(name) => Json(name.to_string()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Deserialize)]
struct CreateEntryQuery {
    resource_node_name: String,
    filepath: String,
    state: ArtifactState,
    run_id: Option<u64>,
}

async fn create_entry(State(state): State<AppState>, Query(query): Query<CreateEntryQuery>) -> Json<ArtifactEntry> {
    Json(state.metadata.create_entry(
        query.resource_node_name.as_str().into(),
        query.filepath,
        query.state,
        query.run_id,
    ))
}

#[derive(Deserialize)]
struct ResourceNodeQuery {
    resource_node_name: String,
}

async fn merge_artifacts_table(
    State(state): State<AppState>,
    Query(query): Query<ResourceNodeQuery>,
    Json(entries): Json<Vec<ArtifactEntryInput>>,
) -> Json<Vec<ArtifactEntry>> {
    Json(
        state
            .metadata
            .merge_artifacts_table(query.resource_node_name.as_str().into(), entries),
    )
}

#[derive(Deserialize)]
struct EntryExistsQuery {
    resource_node_name: String,
    location: String,
}

async fn entry_exists(State(state): State<AppState>, Query(query): Query<EntryExistsQuery>) -> Json<bool> {
    Json(
        state
            .metadata
            .entry_exists(&query.resource_node_name.as_str().into(), &query.location),
    )
}

#[derive(Deserialize)]
struct NodeRunQuery {
    node_name: String,
    run_id: u64,
}

async fn log_metrics(
    State(state): State<AppState>,
    Query(query): Query<NodeRunQuery>,
    Json(kv): Json<HashMap<String, f64>>,
) -> StatusCode {
    state.metadata.log_metrics(query.node_name.as_str().into(), query.run_id, kv);
    StatusCode::OK
}

async fn log_params(
    State(state): State<AppState>,
    Query(query): Query<NodeRunQuery>,
    Json(kv): Json<HashMap<String, String>>,
) -> StatusCode {
    state.metadata.log_params(query.node_name.as_str().into(), query.run_id, kv);
    StatusCode::OK
}

async fn set_tags(
    State(state): State<AppState>,
    Query(query): Query<NodeRunQuery>,
    Json(kv): Json<HashMap<String, String>>,
) -> StatusCode {
    state.metadata.set_tags(query.node_name.as_str().into(), query.run_id, kv);
    StatusCode::OK
}

async fn get_metrics(State(state): State<AppState>, Query(query): Query<NodeRunQuery>) -> Json<HashMap<String, f64>> {
    Json(state.metadata.get_metrics(&query.node_name.as_str().into(), query.run_id))
}

async fn get_params(
    State(state): State<AppState>,
    Query(query): Query<NodeRunQuery>,
) -> Json<HashMap<String, String>> {
    Json(state.metadata.get_params(&query.node_name.as_str().into(), query.run_id))
}

async fn get_tags(
    State(state): State<AppState>,
    Query(query): Query<NodeRunQuery>,
) -> Json<HashMap<String, String>> {
    Json(state.metadata.get_tags(&query.node_name.as_str().into(), query.run_id))
}

#[derive(Deserialize)]
struct TriggerBody {
    message: String,
}

async fn log_trigger(
    State(state): State<AppState>,
    Query(query): Query<NodeNameQuery>,
    Json(body): Json<TriggerBody>,
) -> StatusCode {
    state.metadata.log_trigger(query.node_name.as_str().into(), body.message);
    StatusCode::OK
}

#[derive(Deserialize)]
struct ResourceStateQuery {
    resource_node_name: String,
    state: ArtifactState,
}

async fn get_num_entries(State(state): State<AppState>, Query(query): Query<ResourceStateQuery>) -> Json<usize> {
    Json(
        state
            .metadata
            .get_num_entries(&query.resource_node_name.as_str().into(), query.state),
    )
}

async fn get_entries(
    State(state): State<AppState>,
    Query(query): Query<ResourceStateQuery>,
) -> Json<Vec<ArtifactEntry>> {
    Json(
        state
            .metadata
            .get_entries(&query.resource_node_name.as_str().into(), query.state),
    )
}
