//! Proxy coordinator: membership registry, request routing, gateway

pub mod grpc;
pub mod http;
pub mod node_client;
pub mod registry;
pub mod server;

pub use grpc::ProxyGrpcService;
pub use registry::MembershipRegistry;
pub use server::ProxyServer;
