//! In-memory state store for known nodes and locally held samples.
//!
//! Both tables are keyed by derived ids, so upserts converge: the same target
//! always lands on the same node record and the same `(from, to, key)` edge
//! always lands on the same sample (last writer wins).
//!
//! Each table sits behind its own `RwLock`. Upserts are atomic per key and
//! list reads take the read lock once, so a list always reflects one
//! consistent snapshot even while writers race with it.

use crate::node::{Node, NodeId, NodeState};
use crate::sample::{unix_timestamp, Sample, SampleId};
use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use std::collections::HashMap;

/// Shared table of nodes and samples. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct StateStore {
    nodes: RwLock<HashMap<NodeId, Node>>,
    samples: RwLock<HashMap<SampleId, Sample>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Insert or overwrite the node with the same id.
    pub fn set_node(&self, node: Node) {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&node.id) {
            Some(existing) => {
                existing.name = node.name;
                existing.state = node.state;
                existing.state_change_ts = node.state_change_ts;
            }
            None => {
                tracing::debug!(node = %node.name, target = %node.target, "new node stored");
                nodes.insert(node.id, node);
            }
        }
    }

    /// Insert the node only if its id is not yet known. Returns whether it
    /// was inserted.
    pub fn add_node(&self, node: Node) -> bool {
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&node.id) {
            return false;
        }
        tracing::debug!(node = %node.name, target = %node.target, "new node stored");
        nodes.insert(node.id, node);
        true
    }

    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.nodes.read().get(&id).cloned()
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<Node> {
        self.nodes
            .read()
            .values()
            .find(|node| node.name == name)
            .cloned()
    }

    /// Record a state transition. The timestamp only moves when the state
    /// actually changes. Returns `false` if the node is unknown.
    pub fn set_node_state(&self, id: NodeId, state: NodeState) -> bool {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&id) {
            Some(node) => {
                if node.state != state {
                    node.state = state;
                    node.state_change_ts = unix_timestamp();
                }
                true
            }
            None => false,
        }
    }

    /// Remove a node. The mesh protocol itself never evicts; this exists for
    /// external eviction policies.
    pub fn delete_node(&self, id: NodeId) -> Option<Node> {
        self.nodes.write().remove(&id)
    }

    pub fn node_list(&self) -> Vec<Node> {
        self.nodes.read().values().cloned().collect()
    }

    pub fn node_list_by_state(&self, state: NodeState) -> Vec<Node> {
        self.nodes
            .read()
            .values()
            .filter(|node| node.state == state)
            .cloned()
            .collect()
    }

    /// Up to `n` distinct nodes in `state`, chosen uniformly at random.
    pub fn random_node_list_by_state(&self, state: NodeState, n: usize) -> Vec<Node> {
        let nodes = self.nodes.read();
        nodes
            .values()
            .filter(|node| node.state == state)
            .choose_multiple(&mut rand::thread_rng(), n)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    // ------------------------------------------------------------------
    // Samples
    // ------------------------------------------------------------------

    /// Insert or overwrite the sample for the same edge and kind.
    pub fn set_sample(&self, sample: Sample) {
        self.samples.write().insert(sample.id, sample);
    }

    pub fn get_sample(&self, id: SampleId) -> Option<Sample> {
        self.samples.read().get(&id).cloned()
    }

    /// Snapshot of every stored sample.
    pub fn sample_list(&self) -> Vec<Sample> {
        self.samples.read().values().cloned().collect()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.read().len()
    }
}
