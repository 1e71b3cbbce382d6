//! Core library for the mesh health fabric.
//!
//! This crate provides the leaf abstractions every other crate builds on:
//! - Deterministic identity hashing for nodes and samples
//! - Node and sample records with their thin wire forms
//! - The in-memory state store shared by the protocol engine and the RPC service

pub mod error;
pub mod identity;
pub mod node;
pub mod sample;
pub mod store;

pub use error::{Error, Result};
pub use node::{Node, NodeId, NodeState, WireNode};
pub use sample::{unix_timestamp, Sample, SampleId, SampleKind, WireSample};
pub use store::StateStore;
