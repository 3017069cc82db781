// SPDX-License-Identifier: Apache-2.0

//! Cross-process RPC round-trip: a sender forwards a local predecessor's
//! signal to a mocked remote receiver, then relays the remote's eventual
//! `/signal_root` callback back to that predecessor.

use anacostia_engine::{NodeCore, NodeKind, SignalResult, Status};
use anacostia_rpc::RpcSenderNode;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sender_forwards_to_remote_and_relays_the_callback_to_its_predecessor() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signal_leaf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (mut sender, _sender_ctrl) = RpcSenderNode::new("sender".into(), reqwest::Client::new(), mock_server.uri());
    let signal_root = sender.signal_root.clone();

    let (mut upstream, _upstream_ctrl) = NodeCore::new("upstream".into(), NodeKind::Action);
    let upstream_successors_table = upstream.successors_signals_table();
    sender.core_mut().connect_predecessor("upstream".into(), upstream_successors_table.clone());
    upstream.connect_successor("sender".into(), sender.core().predecessors_signals_table());

    upstream.status.set(Status::Running);
    sender.core().status.set(Status::Running);

    // The upstream node has already finished its step by the time the
    // sender starts waiting on it.
    upstream.signal_successors(SignalResult::Success);

    let run_handle = tokio::spawn(async move {
        sender.run().await;
    });

    // Give the sender time to post to the mock and enter its wait for the
    // remote's `/signal_root` callback before simulating it.
    tokio::time::sleep(Duration::from_millis(300)).await;
    signal_root.set(SignalResult::Success);

    let relayed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if upstream_successors_table.check_all(&["sender".into()], SignalResult::Success) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(relayed.is_ok(), "sender never relayed the remote's callback back to its predecessor");

    run_handle.abort();
    // `expect(1)` above is checked when `mock_server` is dropped at the end
    // of this test, panicking if the sender never posted to `/signal_leaf`.
}

#[tokio::test]
async fn sender_reports_failure_upstream_without_waiting_on_a_callback_when_the_forward_fails() {
    // No mock mounted: the one request the sender makes gets a connection
    // refused, which the sender must treat as a forwarding failure.
    let unused_server = MockServer::start().await;
    let dead_url = unused_server.uri();
    drop(unused_server);

    let (mut sender, _sender_ctrl) = RpcSenderNode::new("sender".into(), reqwest::Client::new(), dead_url);

    let (mut upstream, _upstream_ctrl) = NodeCore::new("upstream".into(), NodeKind::Action);
    let upstream_successors_table = upstream.successors_signals_table();
    sender.core_mut().connect_predecessor("upstream".into(), upstream_successors_table.clone());
    upstream.connect_successor("sender".into(), sender.core().predecessors_signals_table());

    upstream.status.set(Status::Running);
    sender.core().status.set(Status::Running);
    upstream.signal_successors(SignalResult::Success);

    let run_handle = tokio::spawn(async move {
        sender.run().await;
    });

    let relayed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if upstream_successors_table.check_all(&["sender".into()], SignalResult::Failure) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(relayed.is_ok(), "sender never reported the forwarding failure back to its predecessor");

    run_handle.abort();
}
