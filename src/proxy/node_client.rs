//! Outbound gRPC helpers from the proxy to storage nodes

use crate::common::{Error, Result};
use crate::proto::node_client::NodeClient;
use crate::proto::{ReadLineRequest, ReadLineResponse, RegisterNodeRequest, WriteLineRequest, WriteLineResponse};
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

async fn connect(addr: &str, timeout: Duration) -> Result<NodeClient<Channel>> {
    let endpoint = Endpoint::from_shared(format!("http://{addr}"))
        .map_err(|_| Error::InvalidAddress(addr.to_string()))?
        .connect_timeout(timeout)
        .timeout(timeout);
    Ok(NodeClient::new(endpoint.connect().await?))
}

/// Tell the leader about a newly registered member.
pub async fn update_list(leader: &str, address: &str, timeout: Duration) -> Result<()> {
    let mut client = connect(leader, timeout).await?;
    client
        .update_list(RegisterNodeRequest {
            address: address.to_string(),
        })
        .await?;
    Ok(())
}

/// Fetch a line from one node.
pub async fn read_line(node: &str, line: i64, timeout: Duration) -> Result<ReadLineResponse> {
    let mut client = connect(node, timeout).await?;
    let resp = client.read_line(ReadLineRequest { line }).await?;
    Ok(resp.into_inner())
}

/// Send a write to the leader.
pub async fn write_line(
    node: &str,
    line: i64,
    content: &str,
    timeout: Duration,
) -> Result<WriteLineResponse> {
    let mut client = connect(node, timeout).await?;
    let resp = client
        .write_line(WriteLineRequest {
            line,
            content: content.to_string(),
        })
        .await?;
    Ok(resp.into_inner())
}
