//! TLS credentials for clients and servers.
//!
//! Client credentials are a root store built from a CA certificate. The
//! decision of what to do when they cannot be loaded belongs to the caller;
//! [`Security`] makes that choice explicit at the type level.

use crate::error::CredentialError;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use std::fmt;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Client-side TLS configuration trusted for dialing mesh peers.
#[derive(Clone)]
pub struct ClientCredentials {
    config: Arc<ClientConfig>,
}

impl ClientCredentials {
    /// Trust every certificate found in `pem`.
    pub fn from_pem(pem: &[u8]) -> Result<Self, CredentialError> {
        let certs = parse_certs(pem)?;
        let mut roots = RootCertStore::empty();
        for cert in certs {
            roots.add(cert)?;
        }

        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(Self::from_config(Arc::new(config)))
    }

    pub fn from_config(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials").finish_non_exhaustive()
    }
}

/// Server-side certificate chain and key.
#[derive(Clone)]
pub struct ServerCredentials {
    config: Arc<ServerConfig>,
}

impl ServerCredentials {
    pub fn from_pem(cert_chain: &[u8], key: &[u8]) -> Result<Self, CredentialError> {
        let certs = parse_certs(cert_chain)?;
        let key: PrivateKeyDer<'static> =
            rustls_pemfile::private_key(&mut BufReader::new(key))
                .map_err(CredentialError::Pem)?
                .ok_or(CredentialError::NoPrivateKey)?;

        let config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn load(cert_path: &Path, key_path: &Path) -> Result<Self, CredentialError> {
        Self::from_pem(&read(cert_path)?, &read(key_path)?)
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        Arc::clone(&self.config)
    }
}

impl fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredentials").finish_non_exhaustive()
    }
}

/// Transport security chosen for one dial.
#[derive(Clone, Debug)]
pub enum Security {
    Tls(ClientCredentials),
    /// Plaintext, unauthenticated.
    Insecure,
}

impl Security {
    pub fn is_secure(&self) -> bool {
        matches!(self, Security::Tls(_))
    }
}

/// Source of client credentials.
pub trait CredentialProvider: Send + Sync {
    /// Load credentials from a CA certificate file or inline PEM text.
    fn load_client_credentials(
        &self,
        ca_cert_path: Option<&Path>,
        ca_cert: Option<&str>,
    ) -> Result<ClientCredentials, CredentialError>;
}

/// Reads CA certificates as PEM. The file path wins over the inline value.
#[derive(Clone, Copy, Debug, Default)]
pub struct PemCredentialProvider;

impl CredentialProvider for PemCredentialProvider {
    fn load_client_credentials(
        &self,
        ca_cert_path: Option<&Path>,
        ca_cert: Option<&str>,
    ) -> Result<ClientCredentials, CredentialError> {
        let pem = match (ca_cert_path, ca_cert) {
            (Some(path), _) => read(path)?,
            (None, Some(inline)) if !inline.trim().is_empty() => inline.as_bytes().to_vec(),
            _ => return Err(CredentialError::NotConfigured),
        };
        ClientCredentials::from_pem(&pem)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CredentialError> {
    std::fs::read(path).map_err(|source| CredentialError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn parse_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, CredentialError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CredentialError::Pem)?;
    if certs.is_empty() {
        return Err(CredentialError::NoCertificates);
    }
    Ok(certs)
}
