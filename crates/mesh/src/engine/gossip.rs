use super::Mesh;
use crate::error::Result;
use corelib::{Sample, WireNode};
use protocol::{NodeDiscoveryRequest, PushSamplesRequest};

impl Mesh {
    /// Tell `to_node` about `new_node`.
    ///
    /// Best effort: connection and call failures are logged and dropped, never
    /// returned and never retried.
    pub async fn node_discovery(&self, to_node: &WireNode, new_node: &WireNode) {
        let client = match self.connections.get_or_create(to_node).await {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(node = %to_node.name, error = %e, "could not connect to client, skipping node discovery");
                return;
            }
        };

        let request = NodeDiscoveryRequest {
            new_node: new_node.clone(),
            i_am_node: self.local_node(),
        };
        if let Err(e) = client.node_discovery(request).await {
            tracing::warn!(node = %to_node.name, error = %e, "node discovery request failed");
        }
    }

    /// Send every stored sample to `node` in one call.
    ///
    /// Returns without touching the network when there is nothing to send.
    pub async fn push_samples(&self, node: &WireNode) -> Result<()> {
        let samples = self.store.sample_list();
        if samples.is_empty() {
            tracing::debug!("no samples found for push");
            return Ok(());
        }

        let client = self
            .connections
            .get_or_create(node)
            .await
            .inspect_err(|e| tracing::debug!(node = %node.name, error = %e, "could not connect to client"))?;

        let request = PushSamplesRequest {
            samples: samples.iter().map(Sample::to_wire).collect(),
        };
        client
            .push_samples(request)
            .await
            .inspect_err(|e| tracing::debug!(node = %node.name, error = %e, "could not send samples"))
    }

    /// Close and evict the pooled connection to `node`.
    pub async fn close_client(&self, node: &WireNode) -> Result<()> {
        self.connections.close(node).await
    }
}
