//! Node server: registration bootstrap, gRPC serving, timer startup

use crate::common::{Error, NodeConfig, Result};
use crate::node::grpc::NodeGrpcService;
use crate::node::peers;
use crate::node::state::NodeAgent;
use crate::node::store::LineStore;
use crate::node::timer::start_timer;
use crate::proto::RegisterNodeResponse;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct NodeServer {
    config: NodeConfig,
}

impl NodeServer {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting node: {}", self.config.advertise_addr);
        tracing::info!("  Proxy: {}", self.config.proxy_addr);
        tracing::info!("  Data file: {}", self.config.data_path.display());

        let bind_addr: SocketAddr = self
            .config
            .advertise_addr
            .parse()
            .map_err(|_| Error::InvalidAddress(self.config.advertise_addr.clone()))?;

        let store = LineStore::open(&self.config.data_path)?;
        let agent = Arc::new(NodeAgent::new(
            self.config.advertise_addr.clone(),
            self.config.proxy_addr.clone(),
            self.config.rpc_timeout(),
            store,
        ));

        // Registration is the only fatal failure path: without the proxy
        // the node can never learn who leads or who its peers are.
        let registration = register_with_retries(&agent, &self.config).await?;
        if registration.leader {
            tracing::info!("registered as bootstrap leader");
            agent.become_leader();
        } else {
            tracing::info!(leader = %registration.leader_address, "registered as follower");
            agent.note_leader(&registration.leader_address);
        }
        // Adopt the proxy's membership snapshot; heartbeats never carry
        // membership, so this is where earlier joiners become known.
        agent.merge_members(registration.addresses);

        let _timer = start_timer(agent.clone(), self.config.clone());

        let grpc_service = NodeGrpcService::new(agent).into_server();
        tracing::info!("✓ Node ready on {}", bind_addr);

        tonic::transport::Server::builder()
            .add_service(grpc_service)
            .serve(bind_addr)
            .await?;

        Ok(())
    }
}

async fn register_with_retries(
    agent: &NodeAgent,
    config: &NodeConfig,
) -> Result<RegisterNodeResponse> {
    for attempt in 1..=config.register_retries {
        match peers::register_node(agent.proxy_addr(), agent.address(), agent.rpc_timeout()).await
        {
            Ok(resp) if resp.registered => return Ok(resp),
            Ok(_) => {
                return Err(Error::Registration(format!(
                    "proxy {} refused registration",
                    agent.proxy_addr()
                )))
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(attempt, error = %e, "registration attempt failed");
                tokio::time::sleep(config.heartbeat_interval()).await;
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::Registration(format!(
        "proxy {} unreachable after {} attempts",
        agent.proxy_addr(),
        config.register_retries
    )))
}
