//! Proxy coordinator binary

use clap::{Parser, Subcommand};
use linekv::{ProxyConfig, ProxyServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "linekv-proxy")]
#[command(about = "linekv proxy: membership registry and request routing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy
    Serve {
        /// Bind address for the registry gRPC API
        #[arg(long, default_value = "0.0.0.0:50050")]
        grpc: String,

        /// Bind address for the public HTTP gateway
        #[arg(long, default_value = "0.0.0.0:5000")]
        http: String,
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
        Commands::Serve { grpc, http } => {
            let config = ProxyConfig {
                grpc_addr: grpc.parse()?,
                http_addr: http.parse()?,
                ..Default::default()
            };
            ProxyServer::new(config).serve().await?;
        }
    }

    Ok(())
}
