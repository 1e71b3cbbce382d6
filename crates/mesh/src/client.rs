//! Typed client for the mesh RPCs.

use crate::error::{MeshError, Result};
use corelib::WireNode;
use protocol::{
    Channel, JoinMeshResponse, NodeDiscoveryRequest, PushSamplesRequest, Request, Response,
    RpcError, TransportError,
};
use std::fmt;
use std::sync::Arc;

/// A channel bound to one target with one method per mesh RPC.
///
/// Cheap to clone; clones share the underlying channel.
#[derive(Clone)]
pub struct MeshClient {
    target: String,
    channel: Arc<dyn Channel>,
}

impl MeshClient {
    pub fn new(target: impl Into<String>, channel: Arc<dyn Channel>) -> Self {
        Self {
            target: target.into(),
            channel,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub async fn join_mesh(&self, me: WireNode) -> Result<JoinMeshResponse> {
        let request = Request::JoinMesh(me);
        let method = request.method();
        match self.call(request).await? {
            Response::JoinMesh(response) => Ok(response),
            _ => Err(self.rpc_error(RpcError::UnexpectedResponse(method))),
        }
    }

    pub async fn ping(&self, me: WireNode) -> Result<()> {
        self.call_empty(Request::Ping(me)).await
    }

    pub async fn node_discovery(&self, request: NodeDiscoveryRequest) -> Result<()> {
        self.call_empty(Request::NodeDiscovery(request)).await
    }

    pub async fn push_samples(&self, request: PushSamplesRequest) -> Result<()> {
        self.call_empty(Request::PushSamples(request)).await
    }

    pub async fn rtt(&self) -> Result<()> {
        self.call_empty(Request::Rtt).await
    }

    pub async fn close(&self) -> std::result::Result<(), TransportError> {
        self.channel.close().await
    }

    async fn call(&self, request: Request) -> Result<Response> {
        self.channel
            .unary(request)
            .await
            .map_err(|source| self.rpc_error(source))
    }

    async fn call_empty(&self, request: Request) -> Result<()> {
        let method = request.method();
        match self.call(request).await? {
            Response::Empty => Ok(()),
            _ => Err(self.rpc_error(RpcError::UnexpectedResponse(method))),
        }
    }

    fn rpc_error(&self, source: RpcError) -> MeshError {
        MeshError::Rpc {
            target: self.target.clone(),
            source,
        }
    }
}

impl fmt::Debug for MeshClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshClient")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
