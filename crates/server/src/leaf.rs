// SPDX-License-Identifier: Apache-2.0

//! A leaf pipeline server: mounts its nodes under `/{pipeline-id}/{node-name}`
//! and answers the root's registration handshake with that id.

use crate::error::Error;
use crate::state::AppState;
use crate::{metadata_routes, node_routes, resource_routes, rpc_routes};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tracing::info;
use uuid::Uuid;

/// Caps in-flight admin requests per server so a slow resource-stream client
/// can't starve status/work polling for the rest of the pipeline.
const MAX_CONCURRENT_REQUESTS: usize = 256;

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(rename = "sender_host")]
    _sender_host: String,
    #[serde(rename = "sender_port")]
    _sender_port: u16,
    #[serde(rename = "sender_name")]
    _sender_name: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    pipeline_id: Uuid,
}

/// Serves one leaf pipeline's HTTP surface.
pub struct LeafServer {
    router: Router,
}

impl LeafServer {
    /// Builds the router for `state`, assigning `pipeline_id` as the prefix
    /// every node is mounted under.
    #[must_use]
    pub fn new(state: AppState, pipeline_id: Uuid) -> Self {
        let nodes = node_routes::routes()
            .merge(rpc_routes::routes())
            .merge(resource_routes::routes())
            .merge(metadata_routes::routes())
            .with_state(state);

        let router = Router::new()
            .nest(&format!("/{pipeline_id}"), nodes)
            .route("/register", post(register).with_state(pipeline_id))
            .layer(ServiceBuilder::new().layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS)));

        Self { router }
    }

    /// Binds `addr` and serves until the process receives SIGINT.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::BindFailed {
            addr: addr.to_string(),
            details: e.to_string(),
        })?;
        info!(%addr, "leaf pipeline server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|e| Error::ServeFailed {
                addr: addr.to_string(),
                details: e.to_string(),
            })
    }
}

async fn register(State(pipeline_id): State<Uuid>, Json(_request): Json<RegisterRequest>) -> Json<RegisterResponse> {
    Json(RegisterResponse { pipeline_id })
}
