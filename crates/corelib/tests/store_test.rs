//! Tests for the state store.
//!
//! # Test Strategy
//!
//! 1. **Node table**: upsert by id, lookup by name, filtering by state
//! 2. **Sample table**: last-writer-wins per edge and kind
//! 3. **Concurrency**: racing writers against snapshot readers

use corelib::{Node, NodeState, Sample, SampleKind, StateStore};
use std::sync::Arc;
use std::thread;

// ============================================================================
// Node Table Tests
// ============================================================================

#[test]
fn test_empty_store() {
    let store = StateStore::new();
    assert_eq!(store.node_count(), 0);
    assert_eq!(store.sample_count(), 0);
    assert!(store.node_list().is_empty());
    assert!(store.sample_list().is_empty());
    assert!(store.random_node_list_by_state(NodeState::Ok, 1).is_empty());
}

#[test]
fn test_same_target_converges_to_one_record() {
    let store = StateStore::new();
    store.set_node(Node::new("node_1", "target_1", NodeState::Ok));
    store.set_node(Node::new("node_2", "target_2", NodeState::Warning));
    store.set_node(Node::new("node_1_again", "target_1", NodeState::NotOk));

    assert_eq!(store.node_count(), 2);
    assert!(store.get_node_by_name("node_1").is_none());

    let node = store.get_node_by_name("node_1_again").expect("renamed record");
    assert_eq!(node.target, "target_1");
    assert_eq!(node.state, NodeState::NotOk);
}

#[test]
fn test_node_list_by_state() {
    let store = StateStore::new();
    store.set_node(Node::new("node_1", "target_1", NodeState::Ok));
    store.set_node(Node::new("node_2", "target_2", NodeState::Warning));
    store.set_node(Node::new("node_3", "target_3", NodeState::Warning));
    store.set_node(Node::new("node_4", "target_4", NodeState::NotOk));
    store.set_node(Node::new("node_5", "target_5", NodeState::NotOk));

    assert_eq!(store.node_list().len(), 5);
    assert_eq!(store.node_list_by_state(NodeState::Ok).len(), 1);
    assert_eq!(store.node_list_by_state(NodeState::Warning).len(), 2);
    assert_eq!(store.node_list_by_state(NodeState::NotOk).len(), 2);
}

#[test]
fn test_delete_node() {
    let store = StateStore::new();
    let node = Node::new("node_1", "target_1", NodeState::Ok);
    let id = node.id;
    store.set_node(node);

    assert_eq!(store.delete_node(id).map(|n| n.name), Some("node_1".into()));
    assert!(store.get_node(id).is_none());
    assert!(store.delete_node(id).is_none());
}

// ============================================================================
// Sample Table Tests
// ============================================================================

#[test]
fn test_samples_keyed_by_edge_and_kind() {
    let store = StateStore::new();
    store.set_sample(Sample::new("node_1", "node_2", SampleKind::RttTotal, "12345", 1));
    store.set_sample(Sample::new("node_1", "node_3", SampleKind::RttTotal, "454545", 2));
    store.set_sample(Sample::new("node_2", "node_3", SampleKind::RttRequest, "8910", 3));
    store.set_sample(Sample::new("node_2", "node_3", SampleKind::RttTotal, "9999", 3));

    assert_eq!(store.sample_count(), 4);

    store.set_sample(Sample::new("node_1", "node_2", SampleKind::RttTotal, "1", 9));
    assert_eq!(store.sample_count(), 4);

    let latest = store
        .sample_list()
        .into_iter()
        .find(|s| s.from == "node_1" && s.to == "node_2")
        .unwrap();
    assert_eq!(latest.value, "1");
    assert_eq!(latest.ts, 9);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_concurrent_upserts_and_snapshots() {
    let store = Arc::new(StateStore::new());
    let mut handles = Vec::new();

    for writer in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..250 {
                let to = format!("node_{}", i % 25);
                store.set_sample(Sample::new(
                    format!("writer_{}", writer),
                    to,
                    SampleKind::RttRequest,
                    i.to_string(),
                    i as i64,
                ));
                store.set_node(Node::new(
                    format!("node_{}", i % 25),
                    format!("10.0.0.{}:8081", i % 25),
                    NodeState::Ok,
                ));
            }
        }));
    }

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..100 {
                let snapshot = store.sample_list();
                assert!(snapshot.len() <= 100);
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(store.sample_count(), 100);
    assert_eq!(store.node_count(), 25);
}
