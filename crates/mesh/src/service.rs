//! The answering side of the mesh RPCs.
//!
//! Every incoming request only ever stores what the wire form carries plus a
//! locally chosen state, so peers cannot inject ids or states.

use crate::engine::Mesh;
use async_trait::async_trait;
use corelib::{Node, NodeState, Sample, WireNode};
use protocol::{
    Handler, JoinMeshResponse, NodeDiscoveryRequest, PushSamplesRequest, Request, Response,
};
use std::sync::Arc;

pub struct MeshService {
    mesh: Arc<Mesh>,
}

impl MeshService {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self { mesh }
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Accept a joining node unless its name is taken by a different target.
    ///
    /// Accepted joiners are announced to every other known node in the
    /// background.
    pub fn join_mesh(&self, joiner: WireNode) -> JoinMeshResponse {
        let me = self.mesh.local_node();
        let store = self.mesh.store();
        let joiner_id = joiner.id();

        let taken_locally = joiner.name == me.name && joiner_id != me.id();
        let taken_remotely = store
            .get_node_by_name(&joiner.name)
            .is_some_and(|existing| existing.id != joiner_id);
        if taken_locally || taken_remotely {
            tracing::info!(name = %joiner.name, target = %joiner.target, "rejecting join, name is not unique");
            return JoinMeshResponse {
                name_unique: false,
                my_name: me.name,
                nodes: Vec::new(),
            };
        }

        store.set_node(Node::from_wire(&joiner, NodeState::Ok));
        tracing::info!(name = %joiner.name, target = %joiner.target, "node joined");

        let nodes = store.node_list();
        for other in nodes.iter().filter(|n| n.id != joiner_id && n.id != me.id()) {
            let mesh = Arc::clone(&self.mesh);
            let to_node = other.to_wire();
            let new_node = joiner.clone();
            tokio::spawn(async move {
                mesh.node_discovery(&to_node, &new_node).await;
            });
        }

        JoinMeshResponse {
            name_unique: true,
            my_name: me.name,
            nodes: nodes.iter().map(Node::to_wire).collect(),
        }
    }

    /// Mark the pinging node as OK, registering it if unknown.
    pub fn ping(&self, from: WireNode) {
        let store = self.mesh.store();
        if !store.set_node_state(from.id(), NodeState::Ok) {
            store.add_node(Node::from_wire(&from, NodeState::Ok));
        }
    }

    /// Register the announced node and the announcer if they are new.
    pub fn node_discovery(&self, request: NodeDiscoveryRequest) {
        let my_id = self.mesh.local_node().id();
        let store = self.mesh.store();
        for node in [request.new_node, request.i_am_node] {
            if node.id() != my_id && store.add_node(Node::from_wire(&node, NodeState::Ok)) {
                tracing::info!(name = %node.name, target = %node.target, "discovered node");
            }
        }
    }

    /// Store pushed samples. Samples measured by this node are kept as they
    /// are locally; a peer's copy of them is never fresher.
    pub fn push_samples(&self, request: PushSamplesRequest) {
        let me = &self.mesh.config().name;
        let store = self.mesh.store();
        for sample in request.samples.into_iter().filter(|s| &s.from != me) {
            store.set_sample(Sample::from(sample));
        }
    }
}

#[async_trait]
impl Handler for MeshService {
    async fn handle(&self, request: Request) -> Response {
        tracing::trace!(method = %request.method(), "handling request");
        match request {
            Request::JoinMesh(joiner) => Response::JoinMesh(self.join_mesh(joiner)),
            Request::Ping(from) => {
                self.ping(from);
                Response::Empty
            }
            Request::NodeDiscovery(discovery) => {
                self.node_discovery(discovery);
                Response::Empty
            }
            Request::PushSamples(push) => {
                self.push_samples(push);
                Response::Empty
            }
            Request::Rtt => Response::Empty,
        }
    }
}
