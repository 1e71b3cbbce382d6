use super::Mesh;
use crate::error::{MeshError, Result};
use corelib::{Node, NodeState, WireNode};
use protocol::JoinMeshResponse;

/// Result of a join attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A candidate accepted the join; `peer` is the name it answered with.
    Joined { peer: String },
    /// Connected to the mesh, but the local name is already taken.
    NameConflict { candidate: String },
    /// Every candidate failed to connect or answer.
    Exhausted,
}

impl JoinOutcome {
    /// Whether a mesh member was reached.
    pub fn joined(&self) -> bool {
        !matches!(self, JoinOutcome::Exhausted)
    }

    /// Whether every candidate has been used up without an answer.
    pub fn fatal(&self) -> bool {
        matches!(self, JoinOutcome::Exhausted)
    }

    /// `(joined, fatal)`.
    pub fn as_tuple(&self) -> (bool, bool) {
        (self.joined(), self.fatal())
    }

    /// The answering peer's name, or the failure as an error naming `local_name`
    /// on conflict.
    pub fn into_result(self, local_name: &str) -> Result<String> {
        match self {
            JoinOutcome::Joined { peer } => Ok(peer),
            JoinOutcome::NameConflict { .. } => Err(MeshError::NameConflict(local_name.to_owned())),
            JoinOutcome::Exhausted => Err(MeshError::Exhausted),
        }
    }
}

impl From<JoinOutcome> for (bool, bool) {
    fn from(outcome: JoinOutcome) -> Self {
        outcome.as_tuple()
    }
}

impl Mesh {
    /// Join the mesh through the first candidate that answers.
    ///
    /// Candidates are tried in order. Connection and RPC failures move on to
    /// the next candidate; when the last one fails the outcome is
    /// [`JoinOutcome::Exhausted`]. On success the answering peer and every node
    /// it reports (except this node) are stored as OK.
    pub async fn join(&self, candidates: &[String]) -> JoinOutcome {
        let me = self.local_node();
        tracing::debug!(candidates = ?candidates, "starting join");

        for (index, target) in candidates.iter().enumerate() {
            let is_last = index + 1 == candidates.len();
            let candidate = WireNode::new(String::new(), target.clone());

            let response = match self.request_join(&candidate, &me).await {
                Ok(response) => response,
                Err(e) if !is_last => {
                    tracing::debug!(target = %target, error = %e, "join failed, trying next node");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(target = %target, error = %e, "join failed on last candidate");
                    return JoinOutcome::Exhausted;
                }
            };

            // Stops at the first conflict even if candidates remain. Whether
            // the remaining candidates should still be tried is undecided.
            if !response.name_unique {
                tracing::warn!(name = %me.name, target = %target, "node name is not unique in mesh");
                return JoinOutcome::NameConflict {
                    candidate: target.clone(),
                };
            }

            let peer = WireNode::new(response.my_name, target.clone());
            self.store.set_node(Node::from_wire(&peer, NodeState::Ok));
            tracing::info!(name = %peer.name, target = %peer.target, "joined mesh");

            let my_id = me.id();
            for node in response.nodes.iter().filter(|node| node.id() != my_id) {
                self.store.set_node(Node::from_wire(node, NodeState::Ok));
            }

            return JoinOutcome::Joined { peer: peer.name };
        }

        tracing::debug!("no join candidates given");
        JoinOutcome::Exhausted
    }

    async fn request_join(&self, candidate: &WireNode, me: &WireNode) -> Result<JoinMeshResponse> {
        let client = self.connections.get_or_create(candidate).await?;
        client.join_mesh(me.clone()).await
    }
}
