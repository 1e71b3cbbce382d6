//! Transport-agnostic RPC seams.
//!
//! A [`Transport`] dials a target and hands back a [`Channel`] on which unary
//! calls can be issued concurrently. The mesh engine only ever talks to these
//! traits; the TCP implementation lives in [`crate::sender`].

use crate::credentials::Security;
use crate::error::{RpcError, TransportError};
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// How eagerly a dial establishes the underlying connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DialMode {
    /// Return immediately; connect on first use. Dial failures surface on the
    /// first call.
    Lazy,
    /// Return only once the connection is usable.
    Blocking,
}

/// A client handle on which unary calls can be issued.
///
/// Implementations must allow many calls in flight at once.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn unary(&self, request: Request) -> Result<Response, RpcError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Capability to open channels to targets.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dial(
        &self,
        target: &str,
        security: &Security,
        mode: DialMode,
    ) -> Result<Arc<dyn Channel>, TransportError>;
}

/// Byte stream a channel or server runs over: plain TCP or TLS over TCP.
pub(crate) trait AsyncStream: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send {}

impl<T> AsyncStream for T where T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send {}

pub(crate) type BoxStream = Box<dyn AsyncStream>;
