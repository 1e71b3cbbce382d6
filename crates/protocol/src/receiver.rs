//! Server side of the transport: accepts connections and dispatches calls.

use crate::codec;
use crate::credentials::ServerCredentials;
use crate::error::CodecError;
use crate::protocol::{Frame, Request, Response};
use crate::transport::BoxStream;
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio_rustls::TlsAcceptor;

/// Answers incoming mesh RPCs.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Response;
}

/// Accepts connections and runs each incoming call on its own task, so slow
/// handlers never block other calls on the same connection.
pub struct Server {
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
}

impl Server {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        credentials: Option<ServerCredentials>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let tls = credentials.map(|c| TlsAcceptor::from(c.config()));
        Ok(Self { listener, tls })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the task is dropped or aborted.
    pub async fn serve(self, handler: Arc<dyn Handler>) {
        self.serve_with_shutdown(handler, std::future::pending()).await
    }

    pub async fn serve_with_shutdown<F>(self, handler: Arc<dyn Handler>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            addr = ?self.listener.local_addr().ok(),
            tls = self.tls.is_some(),
            "mesh server listening"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("mesh server shutting down");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((tcp, peer)) => {
                        let handler = Arc::clone(&handler);
                        let tls = self.tls.clone();
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(tcp, tls, handler).await {
                                tracing::debug!(peer = %peer, error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to accept connection");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }
    }
}

async fn serve_connection(
    tcp: TcpStream,
    tls: Option<TlsAcceptor>,
    handler: Arc<dyn Handler>,
) -> Result<(), CodecError> {
    let stream: BoxStream = match tls {
        Some(acceptor) => Box::new(acceptor.accept(tcp).await?),
        None => Box::new(tcp),
    };
    let (reader, writer) = tokio::io::split(stream);
    let mut reader = codec::reader(reader);
    let writer = Arc::new(Mutex::new(codec::writer(writer)));

    while let Some(frame) = codec::recv::<_, Frame<Request>>(&mut reader).await? {
        let handler = Arc::clone(&handler);
        let writer = Arc::clone(&writer);
        tokio::spawn(async move {
            let method = frame.body.method();
            let response = Frame {
                call_id: frame.call_id,
                body: handler.handle(frame.body).await,
            };

            let mut writer = writer.lock().await;
            if let Err(e) = codec::send(&mut *writer, &response).await {
                tracing::debug!(method = %method, error = %e, "failed to write response");
            }
        });
    }
    Ok(())
}
