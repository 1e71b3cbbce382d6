//! Messages exchanged between mesh nodes.

use corelib::{WireNode, WireSample};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer to a join attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinMeshResponse {
    /// `false` when the requested name is already taken in the mesh.
    pub name_unique: bool,
    /// Name of the answering node.
    pub my_name: String,
    /// Every node the answering node knows about.
    pub nodes: Vec<WireNode>,
}

/// Notification that the sender learned about `new_node`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDiscoveryRequest {
    pub new_node: WireNode,
    pub i_am_node: WireNode,
}

/// A batch of samples pushed in one call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSamplesRequest {
    pub samples: Vec<WireSample>,
}

/// Name of a unary RPC, used for logging.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    JoinMesh,
    Ping,
    NodeDiscovery,
    PushSamples,
    Rtt,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::JoinMesh => "/mesh.v1.MeshService/JoinMesh",
            Method::Ping => "/mesh.v1.MeshService/Ping",
            Method::NodeDiscovery => "/mesh.v1.MeshService/NodeDiscovery",
            Method::PushSamples => "/mesh.v1.MeshService/PushSamples",
            Method::Rtt => "/mesh.v1.MeshService/Rtt",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    JoinMesh(WireNode),
    Ping(WireNode),
    NodeDiscovery(NodeDiscoveryRequest),
    PushSamples(PushSamplesRequest),
    Rtt,
}

impl Request {
    pub fn method(&self) -> Method {
        match self {
            Request::JoinMesh(_) => Method::JoinMesh,
            Request::Ping(_) => Method::Ping,
            Request::NodeDiscovery(_) => Method::NodeDiscovery,
            Request::PushSamples(_) => Method::PushSamples,
            Request::Rtt => Method::Rtt,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    JoinMesh(JoinMeshResponse),
    Empty,
    /// The remote handler failed; carries its message.
    Error(String),
}

/// Envelope tying a message to the call it belongs to, so many calls can
/// share one connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame<T> {
    pub call_id: u64,
    pub body: T,
}
