//! Selection between secure and insecure transport.
//!
//! Loading client credentials can fail (no CA configured, unreadable file,
//! bad PEM). In that case the node still dials, in plaintext: availability is
//! preferred over confidentiality. The choice is made here, once per dial, and
//! handed to the transport as an explicit [`Security`] value.

use crate::config::MeshConfig;
use protocol::{CredentialProvider, Security};
use std::path::PathBuf;
use std::sync::Arc;

pub struct SecurityStrategy {
    provider: Arc<dyn CredentialProvider>,
    ca_cert_path: Option<PathBuf>,
    ca_cert: Option<String>,
}

impl SecurityStrategy {
    pub fn new(provider: Arc<dyn CredentialProvider>, config: &MeshConfig) -> Self {
        Self {
            provider,
            ca_cert_path: config.ca_cert_path.clone(),
            ca_cert: config.ca_cert.clone(),
        }
    }

    /// TLS when credentials load, plaintext otherwise.
    pub fn select(&self) -> Security {
        match self
            .provider
            .load_client_credentials(self.ca_cert_path.as_deref(), self.ca_cert.as_deref())
        {
            Ok(credentials) => Security::Tls(credentials),
            Err(e) => {
                tracing::debug!(error = %e, "cannot load TLS credentials, starting insecure connection");
                Security::Insecure
            }
        }
    }
}
