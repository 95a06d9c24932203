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

//! Parallelpedia node plugin server.
//!
//! One axum application carrying both calling surfaces over the same note
//! service: the REST routes under `/parallelpedia/community-notes` and the
//! MCP JSON-RPC endpoint at `/mcp`.

pub mod api;
pub mod config;
pub mod mcp;

use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parallelpedia_dkg::{HttpDkgClient, NoteService};

use api::AppState;
use config::ServerConfig;

/// Build the full application router for a prepared state.
pub fn build_router(config: &ServerConfig, state: AppState) -> Result<Router> {
    let registry = Arc::new(mcp::ToolRegistry::new());
    mcp::register_note_tools(&registry, state.notes.clone())?;
    let handler = Arc::new(mcp::McpHandler::new(registry));

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route(
            "/parallelpedia/community-notes",
            get(api::search_notes).post(api::publish_note),
        )
        .route(
            "/parallelpedia/community-notes/:topic_id",
            get(api::get_note),
        )
        .with_state(state)
        .merge(mcp::mcp_router(handler));

    let app = if config.server.enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };

    Ok(app.layer(TraceLayer::new_for_http()))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parallelpedia_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Parallelpedia server");
    config.validate()?;

    // Wallet key stays out of the logs.
    tracing::info!(
        otnode_url = config.dkg.endpoint_display(),
        blockchain = config.dkg.blockchain.as_deref().unwrap_or("NOT SET"),
        publish_wallet = if config.dkg.publish_wallet.is_some() {
            "SET (hidden)"
        } else {
            "NOT SET"
        },
        "DKG configuration"
    );
    if config.dkg.otnode_url.is_none() {
        tracing::warn!(
            "DKG_OTNODE_URL is not set; note reads and publishes will fail until it is configured"
        );
    }

    let client = Arc::new(HttpDkgClient::new(
        config.dkg.otnode_url.clone().unwrap_or_default(),
    ));
    let service = Arc::new(NoteService::new(
        config.dkg.clone(),
        client.clone(),
        client,
    ));
    let state = AppState { notes: service };

    let app = build_router(&config, state)?;

    let addr = config.socket_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
