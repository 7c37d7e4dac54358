//! Public HTTP gateway
//!
//! Thin adapter in front of the registry's node-selection logic: reads are
//! rotated round-robin away from the leader, writes go to the leader.
//! Every response embeds the numeric status in the JSON body alongside the
//! HTTP status code.

use crate::common::{Error, Result};
use crate::proxy::node_client;
use crate::proxy::registry::MembershipRegistry;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<MembershipRegistry>,
    pub rpc_timeout: Duration,
}

pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handle_read).post(handle_write))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ReadRequest {
    index: i64,
}

#[derive(Debug, Serialize)]
struct ReadReply {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteRequest {
    index: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct WriteReply {
    status: u16,
}

async fn handle_read(
    State(state): State<GatewayState>,
    body: std::result::Result<Json<ReadRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Malformed input is rejected at the boundary and never reaches a node.
    let Ok(Json(req)) = body else {
        return read_reply(StatusCode::BAD_REQUEST, None);
    };
    if req.index < 0 {
        return read_reply(StatusCode::BAD_REQUEST, None);
    }

    match route_read(&state, req.index).await {
        Ok(content) => read_reply(StatusCode::OK, Some(content)),
        Err(e) => {
            let content = matches!(e, Error::LineNotFound(_)).then(|| e.to_string());
            read_reply(e.to_http_status(), content)
        }
    }
}

async fn handle_write(
    State(state): State<GatewayState>,
    body: std::result::Result<Json<WriteRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Ok(Json(req)) = body else {
        return write_reply(StatusCode::BAD_REQUEST);
    };
    if req.index < 0 {
        return write_reply(StatusCode::BAD_REQUEST);
    }

    match route_write(&state, req.index, &req.message).await {
        Ok(true) => write_reply(StatusCode::OK),
        // The node applied nothing; the request itself was unacceptable.
        Ok(false) => write_reply(StatusCode::BAD_REQUEST),
        Err(e) => write_reply(e.to_http_status()),
    }
}

/// Pick the next read node and fetch the line from it. An empty cluster
/// routes nothing; an unsuccessful node reply means the line does not exist.
async fn route_read(state: &GatewayState, index: i64) -> Result<String> {
    let node = state.registry.next_read_node().ok_or(Error::NoNodes)?;
    let resp = match node_client::read_line(&node, index, state.rpc_timeout).await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(node = %node, error = %e, "read node unreachable");
            return Err(e);
        }
    };
    if resp.success {
        Ok(resp.content)
    } else {
        Err(Error::LineNotFound(index))
    }
}

/// Forward a write to the current leader.
async fn route_write(state: &GatewayState, index: i64, message: &str) -> Result<bool> {
    let leader = state.registry.write_node().ok_or(Error::NoLeader)?;
    match node_client::write_line(&leader, index, message, state.rpc_timeout).await {
        Ok(resp) => Ok(resp.success),
        Err(e) => {
            tracing::warn!(leader = %leader, error = %e, "leader unreachable for write");
            Err(e)
        }
    }
}

fn read_reply(status: StatusCode, content: Option<String>) -> (StatusCode, Json<ReadReply>) {
    (
        status,
        Json(ReadReply {
            status: status.as_u16(),
            content,
        }),
    )
}

fn write_reply(status: StatusCode) -> (StatusCode, Json<WriteReply>) {
    (
        status,
        Json(WriteReply {
            status: status.as_u16(),
        }),
    )
}
