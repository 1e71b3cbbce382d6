//! Wire protocol and transport for mesh RPCs.
//!
//! This crate provides everything between a mesh operation and the socket:
//! - Request/response messages for every mesh RPC
//! - Length-prefixed bincode framing
//! - Object-safe `Transport`/`Channel` seams plus a timeout interceptor
//! - Client and server TLS credentials
//! - A multiplexed TCP client channel and the accepting RPC server

pub mod codec;
pub mod credentials;
pub mod error;
pub mod interceptor;
pub mod protocol;
pub mod receiver;
pub mod sender;
pub mod transport;

pub use credentials::{
    ClientCredentials, CredentialProvider, PemCredentialProvider, Security, ServerCredentials,
};
pub use error::{CodecError, CredentialError, RpcError, TransportError};
pub use interceptor::Timeout;
pub use protocol::{JoinMeshResponse, Method, NodeDiscoveryRequest, PushSamplesRequest, Request, Response};
pub use receiver::{Handler, Server};
pub use sender::TcpTransport;
pub use transport::{Channel, DialMode, Transport};
