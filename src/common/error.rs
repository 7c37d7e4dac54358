//! Error types for linekv

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Storage Errors ===
    #[error("Line not found: {0}")]
    LineNotFound(i64),

    // === Cluster Errors ===
    #[error("No leader established")]
    NoLeader,

    #[error("No nodes registered")]
    NoNodes,

    #[error("Not a cluster member: {0}")]
    NotMember(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    // === Network Errors ===
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl Error {
    /// Is this a retryable error?
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::NoLeader | Error::NoNodes | Error::Registration(_)
        )
    }

    /// Convert to gRPC status for RPC responses
    pub fn to_grpc_status(&self) -> tonic::Status {
        use tonic::Code;
        match self {
            Error::LineNotFound(_) | Error::NotMember(_) => {
                tonic::Status::new(Code::NotFound, self.to_string())
            }
            Error::NoLeader | Error::NoNodes => {
                tonic::Status::new(Code::Unavailable, self.to_string())
            }
            Error::InvalidAddress(_) => tonic::Status::new(Code::InvalidArgument, self.to_string()),
            Error::Grpc(status) => status.clone(),
            _ => tonic::Status::new(Code::Internal, self.to_string()),
        }
    }

    /// Convert to HTTP status code for the gateway
    pub fn to_http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Error::LineNotFound(_) => StatusCode::NOT_FOUND,
            Error::NoLeader | Error::NoNodes | Error::Transport(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn http_mapping_matches_gateway_contract() {
        assert_eq!(Error::LineNotFound(7).to_http_status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::NoLeader.to_http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(Error::NoNodes.to_http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            Error::InvalidAddress("nope".to_string()).to_http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(Error::NoLeader.is_retryable());
        assert!(Error::NoNodes.is_retryable());
        assert!(Error::Registration("proxy down".to_string()).is_retryable());
        assert!(!Error::LineNotFound(0).is_retryable());
        assert!(!Error::Grpc(tonic::Status::invalid_argument("bad address")).is_retryable());
    }
}
