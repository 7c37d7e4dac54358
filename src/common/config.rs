//! Configuration for linekv components

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Node Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Proxy coordinator gRPC address (host:port)
    pub proxy_addr: String,

    /// Advertised address of this node (host:port), unique per node
    pub advertise_addr: String,

    /// Path of the line-indexed storage file
    pub data_path: PathBuf,

    /// Election timeout: leader silence tolerated before campaigning
    #[serde(default = "default_election_timeout")]
    pub election_timeout_ms: u64,

    /// Heartbeat fan-out interval, also the timer loop resolution
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,

    /// Per-peer RPC timeout during election/heartbeat/replication fan-out
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,

    /// Registration attempts against the proxy before giving up
    #[serde(default = "default_register_retries")]
    pub register_retries: u32,
}

fn default_election_timeout() -> u64 {
    3_000
}
fn default_heartbeat_interval() -> u64 {
    1_000
}
fn default_rpc_timeout() -> u64 {
    1_000
}
fn default_register_retries() -> u32 {
    5
}

impl NodeConfig {
    pub fn election_timeout(&self) -> Duration {
        Duration::from_millis(self.election_timeout_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            proxy_addr: "127.0.0.1:50050".to_string(),
            advertise_addr: "127.0.0.1:50051".to_string(),
            data_path: PathBuf::from("./file.txt"),
            election_timeout_ms: default_election_timeout(),
            heartbeat_interval_ms: default_heartbeat_interval(),
            rpc_timeout_ms: default_rpc_timeout(),
            register_retries: default_register_retries(),
        }
    }
}

/// Proxy coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Bind address for the registry gRPC API
    pub grpc_addr: std::net::SocketAddr,

    /// Bind address for the public HTTP gateway
    pub http_addr: std::net::SocketAddr,

    /// Timeout applied when forwarding membership updates to the leader
    #[serde(default = "default_rpc_timeout")]
    pub rpc_timeout_ms: u64,
}

impl ProxyConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            grpc_addr: "0.0.0.0:50050".parse().expect("static addr"),
            http_addr: "0.0.0.0:5000".parse().expect("static addr"),
            rpc_timeout_ms: default_rpc_timeout(),
        }
    }
}
