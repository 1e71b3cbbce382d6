//! The mesh protocol engine.
//!
//! A [`Mesh`] performs one logical operation against one target per call:
//! joining through bootstrap candidates, pinging, propagating discovered
//! nodes, pushing samples and measuring round-trip time. Pooled calls go
//! through the [`ConnectionManager`]; RTT measurement dials its own
//! connection so it can time the handshake.

mod gossip;
mod join;
mod probe;

pub use join::JoinOutcome;
pub use probe::RttMeasurement;

use crate::config::MeshConfig;
use crate::connection::ConnectionManager;
use crate::observe::{MetricsSink, ObservationSink};
use crate::security::SecurityStrategy;
use corelib::{StateStore, WireNode};
use protocol::{CredentialProvider, PemCredentialProvider, TcpTransport, Transport};
use std::sync::Arc;

pub struct Mesh {
    config: MeshConfig,
    store: Arc<StateStore>,
    connections: ConnectionManager,
    transport: Arc<dyn Transport>,
    security: Arc<SecurityStrategy>,
    sink: Arc<dyn ObservationSink>,
}

impl Mesh {
    pub fn builder(config: MeshConfig) -> MeshBuilder {
        MeshBuilder::new(config)
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// This node as announced to peers.
    pub fn local_node(&self) -> WireNode {
        self.config.local_node()
    }
}

/// Assembles a [`Mesh`]. Unset collaborators default to TCP transport, PEM
/// credentials, the `metrics` facade and an empty store.
pub struct MeshBuilder {
    config: MeshConfig,
    transport: Option<Arc<dyn Transport>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    sink: Option<Arc<dyn ObservationSink>>,
    store: Option<Arc<StateStore>>,
}

impl MeshBuilder {
    pub fn new(config: MeshConfig) -> Self {
        Self {
            config,
            transport: None,
            credentials: None,
            sink: None,
            store: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ObservationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn store(mut self, store: Arc<StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Mesh {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(TcpTransport));
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(PemCredentialProvider));
        let security = Arc::new(SecurityStrategy::new(credentials, &self.config));
        let connections = ConnectionManager::new(
            Arc::clone(&transport),
            Arc::clone(&security),
            self.config.request_timeout,
        );

        Mesh {
            store: self.store.unwrap_or_default(),
            sink: self.sink.unwrap_or_else(|| Arc::new(MetricsSink)),
            config: self.config,
            connections,
            transport,
            security,
        }
    }
}
