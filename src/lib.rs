//! # linekv
//!
//! A replicated line-indexed text store:
//! - term-based leader election with heartbeat failure detection
//! - best-effort write replication from the leader to all followers
//! - a proxy that tracks membership and routes reads/writes
//! - gRPC for internal coordination, HTTP for the public API
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────────┐
//!                │       Proxy Coordinator      │
//!                │ membership + leader pointer  │
//!                │ HTTP gateway │ gRPC registry │
//!                └───────┬──────────────────────┘
//!                        │ gRPC
//!          ┌─────────────┼─────────────┐
//!          │             │             │
//!    ┌─────▼─────┐ ┌─────▼─────┐ ┌─────▼─────┐
//!    │  Node 1   │ │  Node 2   │ │  Node 3   │
//!    │ (leader)  │ │ (follower)│ │ (follower)│
//!    │ line file │ │ line file │ │ line file │
//!    └───────────┘ └───────────┘ └───────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start the proxy
//! ```bash
//! linekv-proxy serve --grpc-port 50050 --http-port 5000
//! ```
//!
//! ### Start a storage node
//! ```bash
//! linekv-node serve \
//!   --proxy 127.0.0.1:50050 \
//!   --address 127.0.0.1:50051 \
//!   --filename node1.txt
//! ```
//!
//! ### Use the CLI
//! ```bash
//! linekv --host localhost --port 5000 write 3 "hello"
//! linekv --host localhost --port 5000 read 3
//! ```

pub mod common;
pub mod node;
pub mod proxy;

// Re-export commonly used types
pub use common::{Error, NodeConfig, ProxyConfig, Result};
pub use node::NodeServer;
pub use proxy::ProxyServer;

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("linekv");
}

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
