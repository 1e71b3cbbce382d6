//! Call interceptors applied around a [`Channel`].

use crate::error::{RpcError, TransportError};
use crate::protocol::{Request, Response};
use crate::transport::Channel;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Runs every unary call under a fresh deadline.
///
/// Callers never manage deadlines themselves; each call gets its own
/// `timeout` regardless of how many others are in flight.
pub struct Timeout {
    inner: Arc<dyn Channel>,
    timeout: Duration,
}

impl Timeout {
    pub fn new(inner: Arc<dyn Channel>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Channel for Timeout {
    async fn unary(&self, request: Request) -> Result<Response, RpcError> {
        let method = request.method();
        match tokio::time::timeout(self.timeout, self.inner.unary(request)).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::DeadlineExceeded(method, self.timeout)),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.close().await
    }
}
