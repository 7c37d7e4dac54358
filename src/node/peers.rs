//! Outbound gRPC helpers for node-to-node and node-to-proxy calls
//!
//! Every call here carries a bounded connect and request timeout so a dead
//! peer can never stall the timer loop; a timeout is treated by callers the
//! same as an explicit refusal.

use crate::common::{Error, Result};
use crate::proto::node_client::NodeClient;
use crate::proto::proxy_client::ProxyClient;
use crate::proto::{Empty, RegisterNodeRequest, VoteRequest, VoteResponse, WriteLineRequest};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

fn endpoint(addr: &str, timeout: Duration) -> Result<Endpoint> {
    Ok(Endpoint::from_shared(format!("http://{addr}"))
        .map_err(|_| Error::InvalidAddress(addr.to_string()))?
        .connect_timeout(timeout)
        .timeout(timeout))
}

async fn connect_node(addr: &str, timeout: Duration) -> Result<NodeClient<Channel>> {
    Ok(NodeClient::new(endpoint(addr, timeout)?.connect().await?))
}

async fn connect_proxy(addr: &str, timeout: Duration) -> Result<ProxyClient<Channel>> {
    Ok(ProxyClient::new(endpoint(addr, timeout)?.connect().await?))
}

/// Solicit one peer's vote for `candidate` in `term`.
pub async fn request_vote(
    peer: &str,
    candidate: &str,
    term: u64,
    timeout: Duration,
) -> Result<VoteResponse> {
    let mut client = connect_node(peer, timeout).await?;
    let resp = client
        .request_vote(VoteRequest {
            candidate_address: candidate.to_string(),
            term,
        })
        .await?;
    Ok(resp.into_inner())
}

/// Send one heartbeat to a peer.
pub async fn append_entries(peer: &str, timeout: Duration) -> Result<()> {
    let mut client = connect_node(peer, timeout).await?;
    client.append_entries(Empty {}).await?;
    Ok(())
}

/// Forward a client write to one follower.
pub async fn write_line(
    peer: &str,
    line: i64,
    content: &str,
    timeout: Duration,
) -> Result<bool> {
    let mut client = connect_node(peer, timeout).await?;
    let resp = client
        .write_line(WriteLineRequest {
            line,
            content: content.to_string(),
        })
        .await?;
    Ok(resp.into_inner().success)
}

/// Join the cluster through the proxy coordinator.
pub async fn register_node(
    proxy: &str,
    address: &str,
    timeout: Duration,
) -> Result<crate::proto::RegisterNodeResponse> {
    let mut client = connect_proxy(proxy, timeout).await?;
    let resp = client
        .register_node(RegisterNodeRequest {
            address: address.to_string(),
        })
        .await?;
    Ok(resp.into_inner())
}

/// Announce an election win to the proxy; returns the full membership
/// snapshot so the new leader learns of nodes registered while it was out
/// of the loop.
pub async fn declare_leader(
    proxy: &str,
    address: &str,
    timeout: Duration,
) -> Result<Vec<String>> {
    let mut client = connect_proxy(proxy, timeout).await?;
    let resp = client
        .declare_leader(RegisterNodeRequest {
            address: address.to_string(),
        })
        .await?;
    Ok(resp.into_inner().addresses)
}
