//! Storage node binary

use clap::{Parser, Subcommand};
use linekv::{NodeConfig, NodeServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "linekv-node")]
#[command(about = "linekv storage node with leader election")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the node
    Serve {
        /// Proxy coordinator gRPC address (host:port)
        #[arg(long, default_value = "127.0.0.1:50050")]
        proxy: String,

        /// Advertised address of this node (host:port)
        #[arg(long, default_value = "127.0.0.1:50051")]
        address: String,

        /// Storage file
        #[arg(long, default_value = "file.txt")]
        filename: PathBuf,

        /// Election timeout in milliseconds
        #[arg(long, default_value = "3000")]
        election_timeout_ms: u64,

        /// Heartbeat interval in milliseconds
        #[arg(long, default_value = "1000")]
        heartbeat_interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            proxy,
            address,
            filename,
            election_timeout_ms,
            heartbeat_interval_ms,
        } => {
            let config = NodeConfig {
                proxy_addr: proxy,
                advertise_addr: address,
                data_path: filename,
                election_timeout_ms,
                heartbeat_interval_ms,
                ..Default::default()
            };
            NodeServer::new(config).serve().await?;
        }
    }

    Ok(())
}
