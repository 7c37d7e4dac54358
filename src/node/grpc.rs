//! Node gRPC service
//!
//! Inbound RPC surface of a node agent: heartbeats, vote requests, line
//! reads/writes, membership updates, and a liveness probe.

use crate::common::Error;
use crate::node::peers;
use crate::node::state::NodeAgent;
use crate::proto::node_server::{Node, NodeServer as NodeGrpcServer};
use crate::proto::*;
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct NodeGrpcService {
    agent: Arc<NodeAgent>,
}

impl NodeGrpcService {
    pub fn new(agent: Arc<NodeAgent>) -> Self {
        Self { agent }
    }

    /// Converts this service into a gRPC server instance.
    pub fn into_server(self) -> NodeGrpcServer<Self> {
        NodeGrpcServer::new(self)
    }
}

#[tonic::async_trait]
impl Node for NodeGrpcService {
    /// Leader heartbeat: accepting it resets the failure detector and
    /// forces this node back to Follower.
    async fn append_entries(&self, _req: Request<Empty>) -> Result<Response<Empty>, Status> {
        self.agent.observe_heartbeat();
        Ok(Response::new(Empty {}))
    }

    async fn request_vote(
        &self,
        req: Request<VoteRequest>,
    ) -> Result<Response<VoteResponse>, Status> {
        let req = req.into_inner();
        let (vote_granted, term) = self
            .agent
            .handle_vote_request(&req.candidate_address, req.term);
        Ok(Response::new(VoteResponse { vote_granted, term }))
    }

    async fn read_line(
        &self,
        req: Request<ReadLineRequest>,
    ) -> Result<Response<ReadLineResponse>, Status> {
        let req = req.into_inner();
        let resp = match self.agent.store().read(req.line) {
            Ok(content) => ReadLineResponse {
                content,
                success: true,
            },
            Err(Error::LineNotFound(_)) => ReadLineResponse {
                content: "line not found".to_string(),
                success: false,
            },
            Err(e) => {
                tracing::error!(line = req.line, error = %e, "read failed");
                ReadLineResponse {
                    content: "error reading storage".to_string(),
                    success: false,
                }
            }
        };
        Ok(Response::new(resp))
    }

    /// Apply the write locally regardless of role; a leader additionally
    /// fans the identical request out to every peer, best-effort. Fan-out
    /// failures never fail the client-visible write.
    async fn write_line(
        &self,
        req: Request<WriteLineRequest>,
    ) -> Result<Response<WriteLineResponse>, Status> {
        let req = req.into_inner();
        match self.agent.store().write(req.line, &req.content) {
            Ok(()) => {
                if self.agent.is_leader() {
                    replicate(&self.agent, &req).await;
                }
                Ok(Response::new(WriteLineResponse { success: true }))
            }
            Err(e) => {
                tracing::error!(line = req.line, error = %e, "write failed");
                Ok(Response::new(WriteLineResponse { success: false }))
            }
        }
    }

    /// Learn about a newly registered member (forwarded by the proxy).
    async fn update_list(
        &self,
        req: Request<RegisterNodeRequest>,
    ) -> Result<Response<RegisterNodeResponse>, Status> {
        let req = req.into_inner();
        if req.address.is_empty() {
            return Err(Status::invalid_argument("empty member address"));
        }
        tracing::info!(address = %req.address, "membership update");
        self.agent.add_member(&req.address);
        Ok(Response::new(RegisterNodeResponse {
            registered: true,
            leader: false,
            leader_address: self
                .agent
                .leader_address()
                .unwrap_or_else(|| self.agent.address().to_string()),
            addresses: self.agent.members(),
        }))
    }

    async fn confirm_alive(&self, _req: Request<Empty>) -> Result<Response<Empty>, Status> {
        Ok(Response::new(Empty {}))
    }
}

/// Sequential best-effort replication fan-out. Each peer call is bounded by
/// the agent's RPC timeout and an unreachable peer is skipped for this
/// round only; it catches up on the next write.
async fn replicate(agent: &NodeAgent, req: &WriteLineRequest) {
    for peer in agent.peers() {
        match peers::write_line(&peer, req.line, &req.content, agent.rpc_timeout()).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(peer = %peer, line = req.line, "follower rejected write"),
            Err(e) => tracing::debug!(peer = %peer, line = req.line, error = %e, "replication skipped"),
        }
    }
}
