// SPDX-License-Identifier: Apache-2.0

//! Exercises the admin HTTP surface directly against `Router<AppState>`,
//! without binding a socket.

use anacostia_engine::{NodeKind, SharedStatus, Status, WorkList};
use anacostia_server::{node_routes, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

fn state_with_two_nodes() -> AppState {
    let mut state = AppState::default();
    state.nodes.register(
        "metadata_store".into(),
        NodeKind::MetadataStore,
        SharedStatus::new(Status::Running),
        WorkList::new(),
        Vec::new(),
    );
    state.nodes.register(
        "images".into(),
        NodeKind::Resource,
        SharedStatus::new(Status::Waiting),
        WorkList::new(),
        vec!["metadata_store".into()],
    );
    state
}

#[tokio::test]
async fn pipeline_model_reports_every_registered_node_with_derived_successors() {
    let router = node_routes::routes().with_state(state_with_two_nodes());

    let response = router
        .oneshot(Request::builder().uri("/api/pipeline").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let model: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let nodes = model["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);

    let metadata_store = nodes.iter().find(|n| n["name"] == "metadata_store").unwrap();
    assert_eq!(metadata_store["predecessors"].as_array().unwrap().len(), 0);
    assert_eq!(metadata_store["successors"], serde_json::json!(["images"]));

    let images = nodes.iter().find(|n| n["name"] == "images").unwrap();
    assert_eq!(images["predecessors"], serde_json::json!(["metadata_store"]));
    assert_eq!(images["successors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn status_route_reports_a_registered_nodes_current_status() {
    let router = node_routes::routes().with_state(state_with_two_nodes());

    let response = router
        .oneshot(Request::builder().uri("/images/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"waiting");
}

#[tokio::test]
async fn status_route_404s_for_a_node_not_mounted_on_this_server() {
    let router = node_routes::routes().with_state(state_with_two_nodes());

    let response = router
        .oneshot(Request::builder().uri("/not_a_node/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
