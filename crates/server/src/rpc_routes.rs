// SPDX-License-Identifier: Apache-2.0

//! Routes mounted for RPC sender/receiver nodes.
//!
//! - Sender: `POST /{node}/signal_root` - the remote receiver's callback.
//! - Receiver: `POST /{node}/signal_leaf` - the remote sender's forward.

use crate::state::AppState;
use anacostia_engine::SignalResult;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;

/// Routes every server mounts once per locally hosted RPC sender/receiver.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{node}/signal_root", post(signal_root))
        .route("/{node}/signal_leaf", post(signal_leaf))
}

async fn signal_root(State(state): State<AppState>, Path(node): Path<String>) -> StatusCode {
    match state.rpc.signal_root_of(&node.as_str().into()) {
        Some(event) => {
            event.set(SignalResult::Success);
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn signal_leaf(State(state): State<AppState>, Path(node): Path<String>) -> StatusCode {
    match state.rpc.signal_leaf_of(&node.as_str().into()) {
        Some(event) => {
            event.set(SignalResult::Success);
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}
