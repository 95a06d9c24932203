// Copyright 2025 Parallelpedia Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! MCP Router
//!
//! Axum router configuration for MCP endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::mcp::handlers::McpHandler;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};

/// MCP endpoint paths
pub mod paths {
    /// HTTP POST endpoint for JSON-RPC requests
    pub const MCP_HTTP: &str = "/mcp";
    /// Health check endpoint (GET)
    pub const MCP_HEALTH: &str = "/mcp/health";
}

#[derive(Clone)]
struct McpState {
    handler: Arc<McpHandler>,
}

/// Create the MCP router with all endpoints
pub fn mcp_router(handler: Arc<McpHandler>) -> Router {
    Router::new()
        .route(paths::MCP_HTTP, post(handle_mcp_request))
        .route(paths::MCP_HEALTH, get(handle_mcp_health))
        .with_state(McpState { handler })
}

/// Handle MCP JSON-RPC request over HTTP POST
async fn handle_mcp_request(
    State(state): State<McpState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let response = state.handler.handle_request(request).await;
    Json(response)
}

/// Handle MCP health check (GET /mcp/health)
async fn handle_mcp_health(State(_state): State<McpState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "protocol_version": MCP_PROTOCOL_VERSION,
        "server_name": "parallelpedia-mcp",
        "server_version": env!("CARGO_PKG_VERSION"),
        "capabilities": {
            "tools": true,
            "logging": true
        }
    }))
}
