//! Error types for the wire protocol and transport.

use crate::protocol::Method;
use std::time::Duration;

/// Failure to encode or decode a frame.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("frame of {0} bytes exceeds the maximum of {1} bytes")]
    FrameTooLarge(usize, usize),
}

/// Failure to establish a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid target {0:?}")]
    InvalidTarget(String),

    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tls handshake with {target} failed: {source}")]
    Tls {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {0} is closed")]
    Closed(String),

    #[error("connecting to {0} timed out after {1:?}")]
    Timeout(String, Duration),
}

/// Failure of a unary call on an established (or lazily dialed) channel.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("{0} exceeded deadline of {1:?}")]
    DeadlineExceeded(Method, Duration),

    #[error("connection lost before {0} completed")]
    ConnectionLost(Method),

    #[error("remote error on {0}: {1}")]
    Remote(Method, String),

    #[error("unexpected response to {0}")]
    UnexpectedResponse(Method),
}

/// Failure to load TLS material.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no CA certificate configured")]
    NotConfigured,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificates found in PEM input")]
    NoCertificates,

    #[error("no private key found in PEM input")]
    NoPrivateKey,

    #[error("malformed PEM: {0}")]
    Pem(std::io::Error),

    #[error("tls: {0}")]
    Tls(#[from] rustls::Error),
}
