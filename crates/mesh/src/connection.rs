//! Pool of reusable clients, one per node id.
//!
//! Each id owns a slot that is initialized at most once: concurrent callers
//! for the same node wait on the same dial instead of racing to create
//! duplicate connections. The table lock is only held to find or create the
//! slot, never across a dial or a call, so RPCs to the same or different
//! peers run concurrently.

use crate::client::MeshClient;
use crate::error::{MeshError, Result};
use crate::security::SecurityStrategy;
use corelib::{NodeId, WireNode};
use dashmap::DashMap;
use protocol::{Channel, DialMode, Timeout, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    security: Arc<SecurityStrategy>,
    request_timeout: Duration,
    clients: DashMap<NodeId, Arc<OnceCell<MeshClient>>>,
}

impl ConnectionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        security: Arc<SecurityStrategy>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            security,
            request_timeout,
            clients: DashMap::new(),
        }
    }

    /// Return the cached client for `node`, dialing it first if needed.
    ///
    /// Dial failures are returned as is; nothing is retried here.
    pub async fn get_or_create(&self, node: &WireNode) -> Result<MeshClient> {
        let id = node.id();
        let slot = Arc::clone(
            self.clients
                .entry(id)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        if let Some(client) = slot.get() {
            tracing::trace!(target = %node.target, "client already exists");
            return Ok(client.clone());
        }
        slot.get_or_try_init(|| self.dial(node)).await.cloned()
    }

    /// Close and evict the connection for `node`.
    pub async fn close(&self, node: &WireNode) -> Result<()> {
        let id = node.id();
        let (_, slot) = self
            .clients
            .remove(&id)
            .ok_or(MeshError::NoConnection(id))?;
        let client = slot.get().ok_or(MeshError::NoConnection(id))?;

        client
            .close()
            .await
            .map_err(|source| MeshError::Connection {
                target: node.target.clone(),
                source,
            })
    }

    /// Whether a live client is cached for `node`.
    pub fn contains(&self, node: &WireNode) -> bool {
        self.clients
            .get(&node.id())
            .is_some_and(|slot| slot.initialized())
    }

    /// Number of live cached clients.
    pub fn len(&self) -> usize {
        self.clients
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn dial(&self, node: &WireNode) -> Result<MeshClient> {
        tracing::debug!(target = %node.target, "init client");
        let security = self.security.select();
        let channel = self
            .transport
            .dial(&node.target, &security, DialMode::Lazy)
            .await
            .map_err(|source| {
                tracing::debug!(target = %node.target, error = %source, "dial error");
                MeshError::Connection {
                    target: node.target.clone(),
                    source,
                }
            })?;

        let channel: Arc<dyn Channel> = Arc::new(Timeout::new(channel, self.request_timeout));
        Ok(MeshClient::new(node.target.clone(), channel))
    }
}
