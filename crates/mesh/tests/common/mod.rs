//! Scripted in-memory transport and helpers shared by the mesh tests.
#![allow(dead_code)]

use async_trait::async_trait;
use corelib::SampleKind;
use mesh::{Mesh, MeshConfig, ObservationSink};
use parking_lot::Mutex;
use protocol::{
    Channel, ClientCredentials, CredentialError, CredentialProvider, DialMode, Request, Response,
    RpcError, Security, Transport, TransportError,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const LOCAL_NAME: &str = "self";
pub const LOCAL_TARGET: &str = "self:8081";

type Script = Arc<dyn Fn(&Request) -> Result<Response, RpcError> + Send + Sync>;

#[derive(Clone)]
enum Route {
    /// Dialing fails outright.
    Unreachable,
    /// Every call is answered by the script.
    Answer(Script),
    /// Calls never complete.
    Hang,
}

#[derive(Clone, Debug)]
pub struct Dial {
    pub target: String,
    pub secure: bool,
    pub mode: DialMode,
}

#[derive(Clone, Debug)]
pub struct Call {
    pub target: String,
    pub request: Request,
}

#[derive(Default)]
struct Inner {
    routes: Mutex<HashMap<String, Route>>,
    dials: Mutex<Vec<Dial>>,
    calls: Mutex<Vec<Call>>,
    closes: Mutex<Vec<String>>,
    dial_delay: Mutex<Duration>,
}

/// Transport whose peers are scripted per target. Unknown targets are
/// unreachable.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unreachable(&self, target: &str) {
        self.inner
            .routes
            .lock()
            .insert(target.to_owned(), Route::Unreachable);
    }

    pub fn answer<F>(&self, target: &str, script: F)
    where
        F: Fn(&Request) -> Result<Response, RpcError> + Send + Sync + 'static,
    {
        self.inner
            .routes
            .lock()
            .insert(target.to_owned(), Route::Answer(Arc::new(script)));
    }

    /// Answer every call with an empty response.
    pub fn healthy(&self, target: &str) {
        self.answer(target, |_| Ok(Response::Empty));
    }

    pub fn failing(&self, target: &str) {
        self.answer(target, |request| {
            Err(RpcError::Remote(request.method(), "unavailable".into()))
        });
    }

    pub fn hang(&self, target: &str) {
        self.inner.routes.lock().insert(target.to_owned(), Route::Hang);
    }

    pub fn set_dial_delay(&self, delay: Duration) {
        *self.inner.dial_delay.lock() = delay;
    }

    pub fn dials(&self) -> Vec<Dial> {
        self.inner.dials.lock().clone()
    }

    pub fn dialed_targets(&self) -> Vec<String> {
        self.dials().into_iter().map(|d| d.target).collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().clone()
    }

    pub fn closes(&self) -> Vec<String> {
        self.inner.closes.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn dial(
        &self,
        target: &str,
        security: &Security,
        mode: DialMode,
    ) -> Result<Arc<dyn Channel>, TransportError> {
        let delay = *self.inner.dial_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.inner.dials.lock().push(Dial {
            target: target.to_owned(),
            secure: security.is_secure(),
            mode,
        });

        let route = self.inner.routes.lock().get(target).cloned();
        match route {
            None | Some(Route::Unreachable) => Err(TransportError::Connect {
                target: target.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            }),
            Some(route) => Ok(Arc::new(MockChannel {
                target: target.to_owned(),
                route,
                inner: Arc::clone(&self.inner),
            })),
        }
    }
}

struct MockChannel {
    target: String,
    route: Route,
    inner: Arc<Inner>,
}

#[async_trait]
impl Channel for MockChannel {
    async fn unary(&self, request: Request) -> Result<Response, RpcError> {
        self.inner.calls.lock().push(Call {
            target: self.target.clone(),
            request: request.clone(),
        });
        match &self.route {
            Route::Answer(script) => script(&request),
            Route::Hang => std::future::pending().await,
            Route::Unreachable => unreachable!("unreachable targets never yield a channel"),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.closes.lock().push(self.target.clone());
        Ok(())
    }
}

/// Never has credentials.
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn load_client_credentials(
        &self,
        _ca_cert_path: Option<&Path>,
        _ca_cert: Option<&str>,
    ) -> Result<ClientCredentials, CredentialError> {
        Err(CredentialError::NotConfigured)
    }
}

/// Always hands out a TLS configuration with an empty root store.
pub struct StaticCredentials;

impl CredentialProvider for StaticCredentials {
    fn load_client_credentials(
        &self,
        _ca_cert_path: Option<&Path>,
        _ca_cert: Option<&str>,
    ) -> Result<ClientCredentials, CredentialError> {
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(rustls::RootCertStore::empty())
            .with_no_client_auth();
        Ok(ClientCredentials::from_config(Arc::new(config)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub metric: &'static str,
    pub kind: SampleKind,
    pub peer: String,
    pub seconds: f64,
}

#[derive(Default)]
pub struct RecordingSink {
    observations: Mutex<Vec<Observation>>,
}

impl RecordingSink {
    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().clone()
    }
}

impl ObservationSink for RecordingSink {
    fn observe(&self, metric: &'static str, kind: SampleKind, peer: &str, seconds: f64) {
        self.observations.lock().push(Observation {
            metric,
            kind,
            peer: peer.to_owned(),
            seconds,
        });
    }
}

pub fn config() -> MeshConfig {
    MeshConfig::new(LOCAL_NAME, LOCAL_TARGET).with_request_timeout(Duration::from_millis(200))
}

/// A mesh over `transport` without credentials, reporting to a recording sink.
pub fn mesh(transport: &Arc<MockTransport>) -> (Mesh, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let mesh = Mesh::builder(config())
        .transport(transport.clone())
        .credentials(Arc::new(NoCredentials))
        .sink(sink.clone())
        .build();
    (mesh, sink)
}
