//! TCP client side of the transport.
//!
//! A [`TcpChannel`] owns one connection and multiplexes concurrent calls over
//! it: each request carries a `call_id`, a background task reads responses and
//! completes the matching waiter. Dialing lazily defers the connect to the
//! first call. A connection the peer has dropped is replaced by a fresh one on
//! the next call.

use crate::codec::{self, FrameReader, FrameWriter};
use crate::credentials::Security;
use crate::error::{RpcError, TransportError};
use crate::protocol::{Frame, Request, Response};
use crate::transport::{BoxStream, Channel, DialMode, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use futures::SinkExt;
use parking_lot::Mutex;
use rustls::pki_types::ServerName;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_rustls::TlsConnector;

/// Waiters by call id. `None` once the connection is gone.
type PendingCalls = Mutex<Option<HashMap<u64, oneshot::Sender<Response>>>>;

/// Dials mesh peers over TCP, optionally wrapped in TLS.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpTransport;

#[async_trait]
impl Transport for TcpTransport {
    async fn dial(
        &self,
        target: &str,
        security: &Security,
        mode: DialMode,
    ) -> Result<Arc<dyn Channel>, TransportError> {
        if target.trim().is_empty() {
            return Err(TransportError::InvalidTarget(target.to_owned()));
        }

        let channel = TcpChannel::new(target, security.clone());
        if mode == DialMode::Blocking {
            channel.connection().await?;
        }
        Ok(Arc::new(channel))
    }
}

pub struct TcpChannel {
    target: String,
    security: Security,
    conn: tokio::sync::Mutex<Option<Arc<Connection>>>,
    closed: AtomicBool,
}

struct Connection {
    writer: tokio::sync::Mutex<FrameWriter<WriteHalf<BoxStream>>>,
    pending: Arc<PendingCalls>,
    next_call: AtomicU64,
    reader: JoinHandle<()>,
}

/// Drops the waiter for a call that is abandoned, e.g. by a deadline.
struct CallGuard<'a> {
    pending: &'a PendingCalls,
    call_id: u64,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if let Some(calls) = self.pending.lock().as_mut() {
            calls.remove(&self.call_id);
        }
    }
}

impl TcpChannel {
    pub fn new(target: impl Into<String>, security: Security) -> Self {
        Self {
            target: target.into(),
            security,
            conn: tokio::sync::Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The live connection, dialing a new one if there is none or the last
    /// one was lost. Concurrent callers share a single dial.
    async fn connection(&self) -> Result<Arc<Connection>, TransportError> {
        let mut slot = self.conn.lock().await;
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed(self.target.clone()));
        }
        if let Some(conn) = slot.as_ref() {
            if conn.is_alive() {
                return Ok(Arc::clone(conn));
            }
            tracing::debug!(target = %self.target, "connection lost, redialing");
        }

        let conn = Arc::new(Connection::open(&self.target, &self.security).await?);
        *slot = Some(Arc::clone(&conn));
        Ok(conn)
    }
}

impl Connection {
    async fn open(target: &str, security: &Security) -> Result<Self, TransportError> {
        let stream = connect(target, security).await?;
        let (reader, writer) = tokio::io::split(stream);
        let pending: Arc<PendingCalls> = Arc::new(Mutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_responses(
            target.to_owned(),
            codec::reader(reader),
            Arc::clone(&pending),
        ));

        tracing::debug!(target = %target, secure = security.is_secure(), "connection established");
        Ok(Self {
            writer: tokio::sync::Mutex::new(codec::writer(writer)),
            pending,
            next_call: AtomicU64::new(1),
            reader,
        })
    }
}

impl Connection {
    fn is_alive(&self) -> bool {
        self.pending.lock().is_some() && !self.reader.is_finished()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn unary(&self, request: Request) -> Result<Response, RpcError> {
        let method = request.method();
        let conn = self.connection().await?;

        let call_id = conn.next_call.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let registered = {
            let mut pending = conn.pending.lock();
            match pending.as_mut() {
                Some(calls) => {
                    calls.insert(call_id, tx);
                    true
                }
                None => false,
            }
        };
        if !registered {
            return Err(RpcError::ConnectionLost(method));
        }
        let _guard = CallGuard {
            pending: &conn.pending,
            call_id,
        };

        let frame = Frame {
            call_id,
            body: request,
        };
        {
            let mut writer = conn.writer.lock().await;
            codec::send(&mut *writer, &frame).await?;
        }

        match rx.await {
            Ok(Response::Error(message)) => Err(RpcError::Remote(method, message)),
            Ok(response) => Ok(response),
            Err(_) => Err(RpcError::ConnectionLost(method)),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(TransportError::Closed(self.target.clone()));
        }
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.reader.abort();
            conn.pending.lock().take();
            let mut writer = conn.writer.lock().await;
            if let Err(e) = SinkExt::<Bytes>::close(&mut *writer).await {
                tracing::trace!(target = %self.target, error = %e, "shutdown after close");
            }
        }
        Ok(())
    }
}

async fn read_responses(
    target: String,
    mut reader: FrameReader<ReadHalf<BoxStream>>,
    pending: Arc<PendingCalls>,
) {
    loop {
        match codec::recv::<_, Frame<Response>>(&mut reader).await {
            Ok(Some(frame)) => {
                let waiter = pending
                    .lock()
                    .as_mut()
                    .and_then(|calls| calls.remove(&frame.call_id));
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(frame.body);
                    }
                    None => tracing::trace!(target = %target, call_id = frame.call_id, "response for abandoned call"),
                }
            }
            Ok(None) => {
                tracing::debug!(target = %target, "connection closed by peer");
                break;
            }
            Err(e) => {
                tracing::debug!(target = %target, error = %e, "failed to read response");
                break;
            }
        }
    }

    // Dropping the senders wakes every waiter with a lost connection.
    pending.lock().take();
}

async fn connect(target: &str, security: &Security) -> Result<BoxStream, TransportError> {
    let tcp = TcpStream::connect(target)
        .await
        .map_err(|source| TransportError::Connect {
            target: target.to_owned(),
            source,
        })?;
    if let Err(e) = tcp.set_nodelay(true) {
        tracing::trace!(target = %target, error = %e, "failed to set TCP_NODELAY");
    }

    match security {
        Security::Insecure => Ok(Box::new(tcp)),
        Security::Tls(credentials) => {
            let connector = TlsConnector::from(credentials.config());
            let stream = connector
                .connect(server_name(target)?, tcp)
                .await
                .map_err(|source| TransportError::Tls {
                    target: target.to_owned(),
                    source,
                })?;
            Ok(Box::new(stream))
        }
    }
}

/// Host part of `host:port`, used for TLS server name verification.
fn server_name(target: &str) -> Result<ServerName<'static>, TransportError> {
    let host = target
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(target)
        .trim_start_matches('[')
        .trim_end_matches(']');
    ServerName::try_from(host.to_owned())
        .map_err(|_| TransportError::InvalidTarget(target.to_owned()))
}
