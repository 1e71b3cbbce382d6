//! Node records and their thin wire form.
//!
//! A [`Node`] is the rich, locally held record. A [`WireNode`] is what crosses
//! the network: name and target only. Converting a wire node into a record
//! requires the caller to supply the state, so a remote peer can never inject
//! ids, states or timestamps into the local store.

use crate::identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact identifier for a node in the mesh, derived from its target.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Health status of a node as seen by the local process.
///
/// Transitions are decided by whoever drives the health evaluation; the core
/// only records what Join, Ping and discovery observe.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeState {
    Ok,
    Warning,
    NotOk,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Ok => "ok",
            NodeState::Warning => "warning",
            NodeState::NotOk => "not-ok",
        };
        f.write_str(s)
    }
}

/// Network representation of a node: `{name, target}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireNode {
    pub name: String,
    pub target: String,
}

impl WireNode {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }

    /// Id of the node this wire form refers to.
    #[inline]
    pub fn id(&self) -> NodeId {
        identity::node_id(&self.target)
    }
}

/// A mesh participant as recorded in the local store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Human-readable name, confirmed at join time.
    pub name: String,
    /// Dial address (`host:port`). Immutable for a given id.
    pub target: String,
    pub state: NodeState,
    /// Unix seconds of the last state transition, 0 until one happens.
    pub state_change_ts: i64,
}

impl Node {
    /// Construct a fresh record; the id is derived from `target`.
    pub fn new(name: impl Into<String>, target: impl Into<String>, state: NodeState) -> Self {
        let target = target.into();
        Self {
            id: identity::node_id(&target),
            name: name.into(),
            target,
            state,
            state_change_ts: 0,
        }
    }

    /// Build a full record from its wire form with an externally chosen state.
    pub fn from_wire(wire: &WireNode, state: NodeState) -> Self {
        Self::new(wire.name.clone(), wire.target.clone(), state)
    }

    /// Strip the record down to `{name, target}`.
    pub fn to_wire(&self) -> WireNode {
        WireNode::new(self.name.clone(), self.target.clone())
    }
}

impl From<&Node> for WireNode {
    fn from(node: &Node) -> Self {
        node.to_wire()
    }
}
