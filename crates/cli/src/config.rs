//! Command-line and environment configuration.

use crate::commands::{Command, CommandResult};
use clap::{Args, Parser};
use mesh::MeshConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "mesh-node", version, about = "Run or probe a mesh health node")]
pub struct CliConfig {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, env = "MESH_LOG", default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub async fn run(self) -> anyhow::Result<CommandResult> {
        self.command.run().await
    }
}

/// Identity and client settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Name this node announces to the mesh.
    #[arg(long, env = "MESH_NAME")]
    pub name: String,

    /// Address peers use to reach this node.
    #[arg(long, env = "MESH_TARGET")]
    pub target: String,

    /// Per-request deadline in milliseconds.
    #[arg(
        long,
        env = "MESH_REQUEST_TIMEOUT_MS",
        default_value_t = 5000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout_ms: u64,

    /// CA certificate file used to verify peers.
    #[arg(long, env = "MESH_CA_CERT_PATH")]
    pub ca_cert_path: Option<PathBuf>,

    /// Inline CA certificate (PEM); ignored when a path is given.
    #[arg(long, env = "MESH_CA_CERT")]
    pub ca_cert: Option<String>,
}

impl NodeArgs {
    pub fn mesh_config(&self) -> MeshConfig {
        let mut config = MeshConfig::new(&self.name, &self.target)
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms));
        if let Some(path) = &self.ca_cert_path {
            config = config.with_ca_cert_path(path);
        }
        if let Some(pem) = &self.ca_cert {
            config = config.with_ca_cert(pem);
        }
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Local address to accept mesh RPCs on.
    #[arg(long, env = "MESH_LISTEN", default_value = "0.0.0.0:8081")]
    pub listen: String,

    /// Comma-separated targets to try, in order, when joining.
    #[arg(long, env = "MESH_JOIN", value_delimiter = ',')]
    pub join: Vec<String>,

    #[arg(long, env = "MESH_TLS_CERT", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "MESH_TLS_KEY", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Name of the peer to probe.
    #[arg(long)]
    pub peer_name: String,

    /// Address of the peer to probe.
    #[arg(long)]
    pub peer_target: String,
}
