//! Node agent: storage, election state machine, replication

pub mod grpc;
pub mod peers;
pub mod server;
pub mod state;
pub mod store;
pub mod timer;

pub use grpc::NodeGrpcService;
pub use server::NodeServer;
pub use state::{NodeAgent, NodeState, Role};
pub use store::LineStore;
