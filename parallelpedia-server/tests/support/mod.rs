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

//! Shared test support: scripted stub clients and an app builder.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use parallelpedia_dkg::{
    AssetClient, BindingRow, DkgConfig, DkgError, GraphClient, NoteService, PublishOptions,
    SparqlTerm,
};
use parallelpedia_server::api::AppState;
use parallelpedia_server::build_router;
use parallelpedia_server::config::ServerConfig;

pub const REMOTE_NODE: &str = "https://v6-pegasus-node-02.origin-trail.network:8900";

pub fn remote_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.dkg = DkgConfig {
        otnode_url: Some(REMOTE_NODE.to_string()),
        blockchain: Some("otp:20430".to_string()),
        publish_wallet: Some("0xkey".to_string()),
    };
    config
}

pub fn localhost_config() -> ServerConfig {
    let mut config = remote_config();
    config.dkg.otnode_url = Some("http://localhost:8900".to_string());
    config
}

/// Graph stub answering each query with the next scripted response; an
/// exhausted script answers with empty result sets.
pub struct StubGraph {
    responses: Mutex<Vec<Result<Vec<BindingRow>, DkgError>>>,
}

impl StubGraph {
    pub fn new(responses: Vec<Result<Vec<BindingRow>, DkgError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl GraphClient for StubGraph {
    async fn query_select(&self, _query: &str) -> Result<Vec<BindingRow>, DkgError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Vec::new())
        } else {
            responses.remove(0)
        }
    }
}

/// Asset stub with a single scripted create response and call tracking.
pub struct StubAssets {
    create_response: Mutex<Option<Result<Value, DkgError>>>,
    pub create_called: AtomicBool,
    pub get_called: AtomicBool,
}

impl StubAssets {
    pub fn new(create_response: Result<Value, DkgError>) -> Self {
        Self {
            create_response: Mutex::new(Some(create_response)),
            create_called: AtomicBool::new(false),
            get_called: AtomicBool::new(false),
        }
    }

    pub fn unused() -> Self {
        Self {
            create_response: Mutex::new(None),
            create_called: AtomicBool::new(false),
            get_called: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AssetClient for StubAssets {
    async fn create(&self, _content: &Value, _options: &PublishOptions) -> Result<Value, DkgError> {
        self.create_called.store(true, Ordering::SeqCst);
        self.create_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(json!({})))
    }

    async fn get(&self, _ual: &str) -> Result<Value, DkgError> {
        self.get_called.store(true, Ordering::SeqCst);
        Ok(json!({ "assertion": { "public": [] } }))
    }
}

pub fn app_with(
    config: ServerConfig,
    graph: Arc<StubGraph>,
    assets: Arc<StubAssets>,
) -> Router {
    let service = Arc::new(NoteService::new(config.dkg.clone(), graph, assets));
    build_router(&config, AppState { notes: service }).unwrap()
}

/// A binding row of plain literal terms.
pub fn row(fields: &[(&str, &str)]) -> BindingRow {
    fields
        .iter()
        .map(|(name, value)| (name.to_string(), SparqlTerm::Literal(value.to_string())))
        .collect()
}

/// Drive one request through the router and decode the JSON body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Send one JSON-RPC request to the MCP endpoint.
pub async fn send_rpc(app: &Router, method: &str, params: Option<Value>) -> Value {
    let mut request = json!({ "jsonrpc": "2.0", "method": method, "id": 1 });
    if let Some(params) = params {
        request["params"] = params;
    }
    let (status, body) = send_json(app, "POST", "/mcp", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    body
}
