//! Subcommands and their results.

use crate::config::{ProbeArgs, ServeArgs};
use anyhow::{bail, Context};
use clap::Subcommand;
use corelib::{Node, NodeState, Sample, WireNode};
use mesh::{Mesh, MeshError, MeshService};
use protocol::{Server, ServerCredentials};
use std::sync::Arc;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve mesh RPCs, optionally joining an existing mesh first.
    Serve(ServeArgs),
    /// Ping a peer once.
    Ping(ProbeArgs),
    /// Measure round-trip time to a peer once and print the samples.
    Rtt(ProbeArgs),
}

#[derive(Debug)]
pub enum CommandResult {
    Stopped,
    Pinged { peer: String },
    Rtt { samples: Vec<Sample> },
}

impl Command {
    pub async fn run(self) -> anyhow::Result<CommandResult> {
        match self {
            Command::Serve(args) => serve(args).await,
            Command::Ping(args) => ping(args).await,
            Command::Rtt(args) => rtt(args).await,
        }
    }
}

impl CommandResult {
    /// Text to print on stdout, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            CommandResult::Stopped => None,
            CommandResult::Pinged { peer } => Some(format!("{} is reachable", peer)),
            CommandResult::Rtt { samples } => {
                let samples: Vec<_> = samples
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "from": s.from,
                            "to": s.to,
                            "key": s.key.name(),
                            "value": s.value,
                            "ts": s.ts,
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&samples).ok()
            }
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<CommandResult> {
    let credentials = match (&args.tls_cert, &args.tls_key) {
        (Some(cert), Some(key)) => Some(
            ServerCredentials::load(cert, key).context("failed to load server TLS credentials")?,
        ),
        _ => None,
    };

    let server = Server::bind(args.listen.as_str(), credentials)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;

    let mesh = Arc::new(Mesh::builder(args.node.mesh_config()).build());
    let service = Arc::new(MeshService::new(Arc::clone(&mesh)));
    let serving = tokio::spawn(server.serve_with_shutdown(service, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }));

    if !args.join.is_empty() {
        match mesh.join(&args.join).await.into_result(&args.node.name) {
            Ok(peer) => tracing::info!(peer = %peer, "joined mesh"),
            Err(e @ MeshError::NameConflict(_)) => tracing::warn!(error = %e, "continuing without a unique name"),
            Err(e) => {
                serving.abort();
                return Err(e).with_context(|| format!("could not join mesh through {:?}", args.join));
            }
        }
    }

    serving.await.context("server task failed")?;
    tracing::info!("server stopped");
    Ok(CommandResult::Stopped)
}

async fn ping(args: ProbeArgs) -> anyhow::Result<CommandResult> {
    let mesh = Mesh::builder(args.node.mesh_config()).build();
    let peer = WireNode::new(&args.peer_name, &args.peer_target);

    mesh.ping(&peer)
        .await
        .with_context(|| format!("ping to {} failed", args.peer_target))?;

    Ok(CommandResult::Pinged {
        peer: args.peer_name,
    })
}

async fn rtt(args: ProbeArgs) -> anyhow::Result<CommandResult> {
    let mesh = Mesh::builder(args.node.mesh_config()).build();
    mesh.store()
        .set_node(Node::new(&args.peer_name, &args.peer_target, NodeState::Ok));

    mesh.rtt().await;

    let samples = mesh.store().sample_list();
    if samples.is_empty() {
        bail!("RTT measurement to {} failed", args.peer_target);
    }
    Ok(CommandResult::Rtt { samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::SampleKind;

    #[test]
    fn test_render_rtt_samples_as_json() {
        let result = CommandResult::Rtt {
            samples: vec![Sample::new("alpha", "beta", SampleKind::RttTotal, "1200", 7)],
        };

        let rendered = result.render().unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value[0]["key"], "rtt_total");
        assert_eq!(value[0]["value"], "1200");
        assert_eq!(value[0]["ts"], 7);
    }

    #[test]
    fn test_render_stopped_prints_nothing() {
        assert!(CommandResult::Stopped.render().is_none());
    }
}
