//! Configuration for a mesh node.

use corelib::WireNode;
use std::path::PathBuf;
use std::time::Duration;

/// Local identity and connection settings.
#[derive(Clone, Debug)]
pub struct MeshConfig {
    /// Name this node announces.
    pub name: String,
    /// Address other nodes dial to reach this node (`host:port`).
    pub target: String,
    /// Deadline applied to every pooled call and to RTT dials.
    pub request_timeout: Duration,
    pub ca_cert_path: Option<PathBuf>,
    /// Inline CA certificate (PEM), used when no path is set.
    pub ca_cert: Option<String>,
}

impl MeshConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            ca_cert_path: None,
            ca_cert: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    pub fn with_ca_cert(mut self, pem: impl Into<String>) -> Self {
        self.ca_cert = Some(pem.into());
        self
    }

    /// This node as it is announced on the wire.
    pub fn local_node(&self) -> WireNode {
        WireNode::new(self.name.clone(), self.target.clone())
    }
}
