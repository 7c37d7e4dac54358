//! Proxy gRPC service: registration and leader declaration

use crate::proxy::node_client;
use crate::proxy::registry::MembershipRegistry;
use crate::proto::proxy_server::{Proxy, ProxyServer as ProxyGrpcServer};
use crate::proto::{DeclareLeaderResponse, RegisterNodeRequest, RegisterNodeResponse};
use std::sync::Arc;
use std::time::Duration;
use tonic::{Request, Response, Status};

pub struct ProxyGrpcService {
    registry: Arc<MembershipRegistry>,
    rpc_timeout: Duration,
}

impl ProxyGrpcService {
    pub fn new(registry: Arc<MembershipRegistry>, rpc_timeout: Duration) -> Self {
        Self {
            registry,
            rpc_timeout,
        }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> ProxyGrpcServer<Self> {
        ProxyGrpcServer::new(self)
    }
}

#[tonic::async_trait]
impl Proxy for ProxyGrpcService {
    /// Join the cluster. The first node ever seen becomes leader; later
    /// joiners are announced to the current leader, and a failed
    /// announcement re-assigns leadership to the newcomer. Every response
    /// carries the full membership snapshot, and every other live member
    /// is told about the newcomer, so each node's view converges on the
    /// whole cluster and keeps its quorum denominator honest.
    async fn register_node(
        &self,
        req: Request<RegisterNodeRequest>,
    ) -> Result<Response<RegisterNodeResponse>, Status> {
        let address = req.into_inner().address;
        if address.is_empty() {
            return Err(Status::invalid_argument("empty node address"));
        }
        tracing::info!(%address, "registration received");

        self.registry.add_member(&address);

        let (leader, leader_address) = if self.registry.bootstrap_leader(&address) {
            tracing::info!(%address, "first node, assigned leadership");
            (true, address.clone())
        } else {
            // Leader index is valid from here on; bootstrap set it above
            // if it was ever unset.
            let current = self
                .registry
                .leader_address()
                .ok_or_else(|| Status::internal("leader pointer lost"))?;
            if current == address {
                (true, address.clone())
            } else {
                // Forward outside the registry lock; only the outcome
                // re-enters it.
                match node_client::update_list(&current, &address, self.rpc_timeout).await {
                    Ok(()) => {
                        tracing::info!(members = self.registry.len(), "membership forwarded to leader");
                        (false, current)
                    }
                    Err(e) => {
                        tracing::warn!(leader = %current, error = %e, "leader unreachable, re-assigning leadership");
                        self.registry.force_leader(&address);
                        (true, address.clone())
                    }
                }
            }
        };

        // Followers learn the newcomer too, best-effort. Without this an
        // early joiner's membership view would stop at the leader, leaving
        // it short of a quorum once the leader dies.
        let addresses = self.registry.members();
        for member in &addresses {
            if *member == address || *member == leader_address {
                continue;
            }
            if let Err(e) = node_client::update_list(member, &address, self.rpc_timeout).await {
                tracing::debug!(member = %member, error = %e, "membership notification skipped");
            }
        }

        Ok(Response::new(RegisterNodeResponse {
            registered: true,
            leader,
            leader_address,
            addresses,
        }))
    }

    /// An election winner announces itself; it must already be a member.
    async fn declare_leader(
        &self,
        req: Request<RegisterNodeRequest>,
    ) -> Result<Response<DeclareLeaderResponse>, Status> {
        let address = req.into_inner().address;
        match self.registry.declare_leader(&address) {
            Ok(addresses) => {
                tracing::info!(%address, "leader declared");
                Ok(Response::new(DeclareLeaderResponse { addresses }))
            }
            Err(e) => {
                tracing::warn!(%address, "leader declaration from unknown node");
                Err(e.to_grpc_status())
            }
        }
    }
}
