//! Tests for the answering side of the mesh RPCs.

mod common;

use common::*;
use corelib::{Node, NodeState, Sample, SampleKind, WireNode};
use mesh::{Mesh, MeshService};
use protocol::{Handler, NodeDiscoveryRequest, PushSamplesRequest, Request, Response};
use std::sync::Arc;
use std::time::Duration;

fn service(transport: &Arc<MockTransport>) -> MeshService {
    let (mesh, _) = mesh(transport);
    MeshService::new(Arc::new(mesh))
}

fn store(service: &MeshService) -> &corelib::StateStore {
    service.mesh().store()
}

async fn wait_for_calls(transport: &MockTransport, count: usize) {
    for _ in 0..100 {
        if transport.calls().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} calls, saw {}", count, transport.calls().len());
}

// ============================================================================
// JoinMesh Tests
// ============================================================================

#[tokio::test]
async fn test_join_accepts_new_name() {
    let transport = MockTransport::new();
    let service = service(&transport);
    let joiner = WireNode::new("alpha", "alpha:8081");

    let response = service.join_mesh(joiner.clone());

    assert!(response.name_unique);
    assert_eq!(response.my_name, LOCAL_NAME);
    assert_eq!(response.nodes, vec![joiner.clone()]);
    let stored = store(&service).get_node(joiner.id()).unwrap();
    assert_eq!(stored.state, NodeState::Ok);
}

#[tokio::test]
async fn test_join_rejects_local_name_from_other_target() {
    let transport = MockTransport::new();
    let service = service(&transport);

    let response = service.join_mesh(WireNode::new(LOCAL_NAME, "imposter:8081"));

    assert!(!response.name_unique);
    assert!(response.nodes.is_empty());
    assert_eq!(store(&service).node_count(), 0);
}

#[tokio::test]
async fn test_join_rejects_name_held_by_other_node() {
    let transport = MockTransport::new();
    let service = service(&transport);
    store(&service).set_node(Node::new("alpha", "alpha:8081", NodeState::Ok));

    let response = service.join_mesh(WireNode::new("alpha", "other:8081"));

    assert!(!response.name_unique);
    assert_eq!(store(&service).node_count(), 1);
}

#[tokio::test]
async fn test_rejoin_with_same_identity_is_accepted() {
    let transport = MockTransport::new();
    let service = service(&transport);
    store(&service).set_node(Node::new("alpha", "alpha:8081", NodeState::NotOk));

    let response = service.join_mesh(WireNode::new("alpha", "alpha:8081"));

    assert!(response.name_unique);
    let stored = store(&service).get_node_by_name("alpha").unwrap();
    assert_eq!(stored.state, NodeState::Ok);
}

#[tokio::test]
async fn test_join_announces_joiner_to_known_nodes() {
    let transport = MockTransport::new();
    transport.healthy("beta:8081");
    let service = service(&transport);
    store(&service).set_node(Node::new("beta", "beta:8081", NodeState::Ok));
    let joiner = WireNode::new("alpha", "alpha:8081");

    let response = service.join_mesh(joiner.clone());
    assert_eq!(response.nodes.len(), 2);

    wait_for_calls(&transport, 1).await;
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].target, "beta:8081");
    assert_eq!(
        calls[0].request,
        Request::NodeDiscovery(NodeDiscoveryRequest {
            new_node: joiner,
            i_am_node: WireNode::new(LOCAL_NAME, LOCAL_TARGET),
        })
    );
}

// ============================================================================
// Ping / Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_ping_registers_unknown_node() {
    let transport = MockTransport::new();
    let service = service(&transport);

    service.ping(WireNode::new("alpha", "alpha:8081"));

    let stored = store(&service).get_node_by_name("alpha").unwrap();
    assert_eq!(stored.state, NodeState::Ok);
}

#[tokio::test]
async fn test_ping_restores_known_node() {
    let transport = MockTransport::new();
    let service = service(&transport);
    store(&service).set_node(Node::new("alpha", "alpha:8081", NodeState::Warning));

    service.ping(WireNode::new("alpha", "alpha:8081"));

    assert_eq!(store(&service).node_count(), 1);
    let stored = store(&service).get_node_by_name("alpha").unwrap();
    assert_eq!(stored.state, NodeState::Ok);
}

#[tokio::test]
async fn test_discovery_adds_only_new_foreign_nodes() {
    let transport = MockTransport::new();
    let service = service(&transport);
    store(&service).set_node(Node::new("beta", "beta:8081", NodeState::Warning));

    service.node_discovery(NodeDiscoveryRequest {
        new_node: WireNode::new("gamma", "gamma:8081"),
        i_am_node: WireNode::new("beta", "beta:8081"),
    });
    service.node_discovery(NodeDiscoveryRequest {
        new_node: WireNode::new(LOCAL_NAME, LOCAL_TARGET),
        i_am_node: WireNode::new("beta", "beta:8081"),
    });

    let store = store(&service);
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.get_node_by_name("gamma").unwrap().state, NodeState::Ok);
    assert_eq!(store.get_node_by_name("beta").unwrap().state, NodeState::Warning);
}

// ============================================================================
// PushSamples / Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_push_stores_foreign_samples_only() {
    let transport = MockTransport::new();
    let service = service(&transport);
    let own = Sample::new(LOCAL_NAME, "alpha", SampleKind::RttTotal, "10", 1);
    store(&service).set_sample(own.clone());

    service.push_samples(PushSamplesRequest {
        samples: vec![
            Sample::new(LOCAL_NAME, "alpha", SampleKind::RttTotal, "999", 2).to_wire(),
            Sample::new("alpha", "beta", SampleKind::RttRequest, "20", 2).to_wire(),
        ],
    });

    let store = store(&service);
    assert_eq!(store.sample_count(), 2);
    assert_eq!(store.get_sample(own.id).unwrap().value, "10");
}

#[tokio::test]
async fn test_handler_dispatches_every_request() {
    let transport = MockTransport::new();
    let (mesh, _) = mesh(&transport);
    let mesh: Arc<Mesh> = Arc::new(mesh);
    let handler: Arc<dyn Handler> = Arc::new(MeshService::new(Arc::clone(&mesh)));

    let response = handler
        .handle(Request::JoinMesh(WireNode::new("alpha", "alpha:8081")))
        .await;
    assert!(matches!(response, Response::JoinMesh(ref r) if r.name_unique));

    assert_eq!(
        handler.handle(Request::Ping(WireNode::new("beta", "beta:8081"))).await,
        Response::Empty
    );
    assert_eq!(handler.handle(Request::Rtt).await, Response::Empty);
    assert_eq!(
        handler
            .handle(Request::PushSamples(PushSamplesRequest::default()))
            .await,
        Response::Empty
    );

    assert_eq!(mesh.store().node_count(), 2);
}
