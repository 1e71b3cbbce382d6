use super::Mesh;
use crate::client::MeshClient;
use crate::error::{MeshError, Result};
use crate::observe::RTT_METRIC;
use corelib::{unix_timestamp, Node, NodeState, Sample, SampleKind, WireNode};
use protocol::{DialMode, Timeout, TransportError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Two round-trip times taken from one exchange.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RttMeasurement {
    /// From starting the dial to receiving the reply.
    pub total: Duration,
    /// From the connection being ready to receiving the reply.
    pub request: Duration,
}

impl RttMeasurement {
    /// `start <= ready <= done` always yields `total >= request`.
    pub fn from_instants(start: Instant, ready: Instant, done: Instant) -> Self {
        Self {
            total: done.saturating_duration_since(start),
            request: done.saturating_duration_since(ready),
        }
    }
}

impl Mesh {
    /// Probe `node` with a Ping carrying the local identity.
    ///
    /// The store is not touched; reacting to the outcome is up to the caller.
    pub async fn ping(&self, node: &WireNode) -> Result<()> {
        let client = self
            .connections
            .get_or_create(node)
            .await
            .inspect_err(|e| tracing::debug!(node = %node.name, error = %e, "could not connect to client"))?;

        client
            .ping(self.local_node())
            .await
            .inspect_err(|e| tracing::debug!(node = %node.name, error = %e, "ping failed"))
    }

    /// Measure round-trip time to one random OK node.
    ///
    /// Does nothing when no node is OK. On success both timings are reported
    /// to the sink and stored as samples; on failure nothing is written.
    pub async fn rtt(&self) {
        let Some(peer) = self
            .store
            .random_node_list_by_state(NodeState::Ok, 1)
            .pop()
        else {
            tracing::debug!("no node suitable for RTT measurement");
            return;
        };
        tracing::debug!(node = %peer.name, "starting RTT measurement");

        match self.measure_rtt(&peer).await {
            Ok(measurement) => self.record_rtt(&peer, measurement),
            Err(e) => tracing::debug!(node = %peer.name, error = %e, "RTT failed"),
        }
    }

    /// Dial a private, blocking connection, time one empty call, then close.
    async fn measure_rtt(&self, peer: &Node) -> Result<RttMeasurement> {
        let security = self.security.select();
        let timeout = self.config.request_timeout;
        let connection_error = |source: TransportError| MeshError::Connection {
            target: peer.target.clone(),
            source,
        };

        let start = Instant::now();
        let channel = tokio::time::timeout(
            timeout,
            self.transport
                .dial(&peer.target, &security, DialMode::Blocking),
        )
        .await
        .map_err(|_| connection_error(TransportError::Timeout(peer.target.clone(), timeout)))?
        .map_err(connection_error)?;
        let ready = Instant::now();

        let client = MeshClient::new(peer.target.clone(), Arc::new(Timeout::new(channel, timeout)));
        let result = client.rtt().await;
        let done = Instant::now();

        if let Err(e) = client.close().await {
            tracing::trace!(node = %peer.name, error = %e, "closing RTT connection failed");
        }
        result?;

        Ok(RttMeasurement::from_instants(start, ready, done))
    }

    fn record_rtt(&self, peer: &Node, measurement: RttMeasurement) {
        tracing::debug!(
            node = %peer.name,
            total = ?measurement.total,
            request = ?measurement.request,
            "RTT succeeded"
        );

        self.sink.observe(
            RTT_METRIC,
            SampleKind::RttTotal,
            &peer.name,
            measurement.total.as_secs_f64(),
        );
        self.sink.observe(
            RTT_METRIC,
            SampleKind::RttRequest,
            &peer.name,
            measurement.request.as_secs_f64(),
        );

        let now = unix_timestamp();
        self.store.set_sample(Sample::new(
            &self.config.name,
            &peer.name,
            SampleKind::RttTotal,
            measurement.total.as_nanos().to_string(),
            now,
        ));
        self.store.set_sample(Sample::new(
            &self.config.name,
            &peer.name,
            SampleKind::RttRequest,
            measurement.request.as_nanos().to_string(),
            now,
        ));
    }
}
