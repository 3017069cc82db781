// SPDX-License-Identifier: Apache-2.0

//! Routes mounted for every node, regardless of kind.
//!
//! - `GET /{node}/status` - node status as text.
//! - `GET /{node}/work` - current work tags, as JSON.
//! - `GET /api/pipeline` - a snapshot of every locally mounted node, as JSON.

use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

/// Routes every server (root or leaf) mounts once per locally hosted node.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{node}/status", get(status))
        .route("/{node}/work", get(work))
        .route("/api/pipeline", get(pipeline_model))
}

async fn status(State(state): State<AppState>, Path(node): Path<String>) -> impl IntoResponse {
    match state.nodes.status_of(&node.as_str().into()) {
        Some(status) => (StatusCode::OK, status.get().to_string()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn work(State(state): State<AppState>, Path(node): Path<String>) -> impl IntoResponse {
    match state.nodes.work_of(&node.as_str().into()) {
        Some(work) => {
            let tags: Vec<String> = work.snapshot().iter().map(ToString::to_string).collect();
            (StatusCode::OK, Json(tags)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn pipeline_model(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.nodes.model())
}
