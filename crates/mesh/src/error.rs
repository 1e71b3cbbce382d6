//! Error types for the mesh protocol engine.

use corelib::NodeId;
use protocol::{RpcError, TransportError};

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Dialing or connection setup failed.
    #[error("connection to {target} failed: {source}")]
    Connection {
        target: String,
        #[source]
        source: TransportError,
    },

    /// The remote call failed or timed out.
    #[error("rpc to {target} failed: {source}")]
    Rpc {
        target: String,
        #[source]
        source: RpcError,
    },

    /// The requested node name is already used by another node.
    #[error("node name {0:?} is not unique in the mesh")]
    NameConflict(String),

    /// No join candidate produced a usable connection and response.
    #[error("no join candidate was reachable")]
    Exhausted,

    #[error("no connection cached for node {0}")]
    NoConnection(NodeId),
}
