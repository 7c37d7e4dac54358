//! Proxy server: registry gRPC API plus public HTTP gateway

use crate::common::{ProxyConfig, Result};
use crate::proxy::grpc::ProxyGrpcService;
use crate::proxy::http::{create_router, GatewayState};
use crate::proxy::registry::MembershipRegistry;
use std::sync::Arc;

pub struct ProxyServer {
    config: ProxyConfig,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting proxy coordinator");
        tracing::info!("  HTTP gateway: {}", self.config.http_addr);
        tracing::info!("  gRPC registry: {}", self.config.grpc_addr);

        let registry = Arc::new(MembershipRegistry::new());

        let grpc_service =
            ProxyGrpcService::new(registry.clone(), self.config.rpc_timeout()).into_server();
        let grpc_server = tonic::transport::Server::builder()
            .add_service(grpc_service)
            .serve(self.config.grpc_addr);

        let http_state = GatewayState {
            registry,
            rpc_timeout: self.config.rpc_timeout(),
        };
        let http_listener = tokio::net::TcpListener::bind(self.config.http_addr).await?;
        let http_server = axum::serve(http_listener, create_router(http_state));

        tracing::info!("✓ Proxy ready");

        tokio::select! {
            res = http_server => {
                if let Err(e) = res {
                    tracing::error!("HTTP gateway error: {}", e);
                }
            }
            res = grpc_server => {
                if let Err(e) = res {
                    tracing::error!("gRPC registry error: {}", e);
                }
            }
        }

        Ok(())
    }
}
