//! Membership and health-convergence protocol for a self-forming mesh.
//!
//! This crate wires the core together:
//! - `ConnectionManager`: pooled, lazily dialed clients keyed by node id
//! - `Mesh`: the protocol engine (join, ping, discovery, sample push, RTT)
//! - `MeshService`: the answering side of every mesh RPC
//! - `ObservationSink`: where RTT measurements are reported
//!
//! Scheduling is left to the caller: every operation here performs one
//! logical step against one target and returns.

pub mod client;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod observe;
pub mod security;
pub mod service;

pub use client::MeshClient;
pub use config::MeshConfig;
pub use connection::ConnectionManager;
pub use engine::{JoinOutcome, Mesh, MeshBuilder, RttMeasurement};
pub use error::{MeshError, Result};
pub use observe::{MetricsSink, NoopSink, ObservationSink, RTT_METRIC};
pub use security::SecurityStrategy;
pub use service::MeshService;
