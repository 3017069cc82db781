// SPDX-License-Identifier: Apache-2.0

//! A root pipeline server: mounts its own nodes at the top level, registers
//! with every configured leaf at startup, and tears the pipeline down when
//! the process receives SIGINT.

use crate::error::Error;
use crate::state::AppState;
use crate::{metadata_routes, node_routes, resource_routes, rpc_routes};
use anacostia_pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Caps in-flight admin requests per server so a slow resource-stream client
/// can't starve status/work polling for the rest of the pipeline.
const MAX_CONCURRENT_REQUESTS: usize = 256;

#[derive(Serialize)]
struct RegisterRequest<'a> {
    sender_host: &'a str,
    sender_port: u16,
    sender_name: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    pipeline_id: Uuid,
}

/// Serves a root pipeline's HTTP surface and owns its shutdown sequence.
pub struct RootServer {
    router: axum::Router,
    client: reqwest::Client,
}

impl RootServer {
    /// Builds the router for `state`. Opens the shared client used both for
    /// the leaf-registration handshake and for any `RpcSenderNode`/
    /// `RpcReceiverNode` traffic this pipeline drives.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let router = node_routes::routes()
            .merge(rpc_routes::routes())
            .merge(resource_routes::routes())
            .merge(metadata_routes::routes())
            .with_state(state)
            .layer(ServiceBuilder::new().layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS)));

        Self {
            router,
            client: reqwest::Client::new(),
        }
    }

    /// Registers this root with `leaf_base_url`, announcing the address this
    /// server will be reachable at, and returns the pipeline id the leaf
    /// minted for the relationship.
    pub async fn register_with_leaf(
        &self,
        leaf_base_url: &str,
        sender_host: &str,
        sender_port: u16,
        sender_name: &str,
    ) -> Result<Uuid, Error> {
        let request = RegisterRequest {
            sender_host,
            sender_port,
            sender_name,
        };
        let response = self
            .client
            .post(format!("{leaf_base_url}/register"))
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::HandshakeFailed {
                leaf_url: leaf_base_url.to_string(),
                source,
            })?
            .json::<RegisterResponse>()
            .await
            .map_err(|source| Error::HandshakeFailed {
                leaf_url: leaf_base_url.to_string(),
                source,
            })?;
        info!(leaf_base_url, pipeline_id = %response.pipeline_id, "registered with leaf");
        Ok(response.pipeline_id)
    }

    /// Binds `addr`, serves until SIGINT, then terminates `pipeline`.
    ///
    /// The first Ctrl-C stops accepting new connections and lets in-flight
    /// requests drain; once the listener has shut down, every node is sent
    /// `Terminate` in reverse topological order and its thread is joined.
    pub async fn serve(self, addr: SocketAddr, pipeline: Pipeline) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::BindFailed {
            addr: addr.to_string(),
            details: e.to_string(),
        })?;
        info!(%addr, "root pipeline server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                warn!("received interrupt, shutting the server down");
            })
            .await
            .map_err(|e| Error::ServeFailed {
                addr: addr.to_string(),
                details: e.to_string(),
            })?;

        info!("server stopped, terminating pipeline nodes");
        pipeline.terminate()?;
        Ok(())
    }
}
