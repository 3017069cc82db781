// SPDX-License-Identifier: Apache-2.0

//! The resource-node RPC callee: exposes artifact queries and streamed
//! upload/download over HTTP.
//!
//! - `GET /{node}/get_num_artifacts?state=`
//! - `GET /{node}/list_artifacts?state=`
//! - `GET /{node}/get_artifact/{*path}` - streamed download, advisory shared lock.
//! - `POST /{node}/upload_stream` - streamed upload; header `X-Filename`
//!   required, optional `Content-Length`; 409 on existing filename.

use crate::state::AppState;
use anacostia_metadata::ArtifactState;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use fs2::FileExt;
use futures::StreamExt;
use serde::Deserialize;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Routes every server mounts once per locally hosted resource node.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{node}/get_num_artifacts", get(get_num_artifacts))
        .route("/{node}/list_artifacts", get(list_artifacts))
        .route("/{node}/get_artifact/{*path}", get(get_artifact))
        .route("/{node}/upload_stream", post(upload_stream))
}

#[derive(Deserialize)]
struct StateQuery {
    state: ArtifactState,
}

async fn get_num_artifacts(
    State(state): State<AppState>,
    Path(node): Path<String>,
    Query(query): Query<StateQuery>,
) -> Response {
    match state.resources.get(&node.as_str().into()) {
        Some(resource) => Json(resource.num_artifacts(query.state)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_artifacts(
    State(state): State<AppState>,
    Path(node): Path<String>,
    Query(query): Query<StateQuery>,
) -> Response {
    match state.resources.get(&node.as_str().into()) {
        Some(resource) => Json(resource.artifact_locations(query.state)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_artifact(
    State(state): State<AppState>,
    Path((node, path)): Path<(String, String)>,
) -> Response {
    let Some(resource) = state.resources.get(&node.as_str().into()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let full_path = resource.resolve(&path);

    let opened = tokio::task::spawn_blocking(move || -> io::Result<std::fs::File> {
        let file = std::fs::File::open(&full_path)?;
        file.lock_shared()?;
        Ok(file)
    })
    .await;

    let std_file = match opened {
        Ok(Ok(file)) => file,
        Ok(Err(err)) if err.kind() == io::ErrorKind::NotFound => {
            return StatusCode::NOT_FOUND.into_response();
        }
        _ => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let file = tokio::fs::File::from_std(std_file);
    let stream = ReaderStream::new(file);
    Body::from_stream(stream).into_response()
}

async fn upload_stream(
    State(state): State<AppState>,
    Path(node): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let Some(resource) = state.resources.get(&node.as_str().into()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(filename) = headers
        .get("X-Filename")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let path = resource.resolve(&filename);
    if let Some(parent) = path.parent() {
        if tokio::fs::create_dir_all(parent).await.is_err() {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let path_for_open = path.clone();
    let opened = tokio::task::spawn_blocking(move || -> io::Result<std::fs::File> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path_for_open)?;
        file.lock_exclusive()?;
        Ok(file)
    })
    .await;

    let std_file = match opened {
        Ok(Ok(file)) => file,
        Ok(Err(err)) if err.kind() == io::ErrorKind::AlreadyExists => {
            return StatusCode::CONFLICT.into_response();
        }
        _ => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let mut file = tokio::fs::File::from_std(std_file);
    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        let chunk: Bytes = match chunk {
            Ok(chunk) => chunk,
            Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        };
        if file.write_all(&chunk).await.is_err() {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }
    if file.flush().await.is_err() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    drop(file);

    resource.register_uploaded(filename);
    StatusCode::OK.into_response()
}
