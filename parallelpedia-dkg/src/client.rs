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

//! Client seams for the DKG, plus the OT-node HTTP implementation.
//!
//! `GraphClient` and `AssetClient` are the boundary between this service and
//! the network: the note service only ever talks to these traits, so tests
//! drive the full workflow with scripted stubs. [`HttpDkgClient`] is the
//! production implementation speaking the OT-node HTTP API; it does
//! request/response shaping only and applies no timeout of its own to query
//! or create calls.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::DkgError;
use crate::normalize::BindingRow;

/// Durability parameters for asset publication.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOptions {
    pub epochs_num: u32,
    pub minimum_number_of_finalization_confirmations: u32,
    pub minimum_number_of_node_replications: u32,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            epochs_num: 2,
            minimum_number_of_finalization_confirmations: 3,
            minimum_number_of_node_replications: 1,
        }
    }
}

/// SPARQL SELECT access to the graph network.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Run a SELECT query and return its binding rows.
    async fn query_select(&self, query: &str) -> Result<Vec<BindingRow>, DkgError>;
}

/// Knowledge-asset operations against the graph network.
#[async_trait]
pub trait AssetClient: Send + Sync {
    /// Publish a new asset and return the node's raw create response.
    /// The node reports some failures inside this response rather than as
    /// an error; the caller classifies them.
    async fn create(&self, content: &Value, options: &PublishOptions) -> Result<Value, DkgError>;

    /// Fetch full asset metadata by UAL.
    async fn get(&self, ual: &str) -> Result<Value, DkgError>;
}

/// OT-node HTTP client implementing both seams.
#[derive(Debug, Clone)]
pub struct HttpDkgClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDkgClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl GraphClient for HttpDkgClient {
    async fn query_select(&self, query: &str) -> Result<Vec<BindingRow>, DkgError> {
        let response = self
            .http
            .post(self.url("/query"))
            .json(&serde_json::json!({ "query": query, "type": "SELECT" }))
            .send()
            .await
            .map_err(into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DkgError::Query(format!(
                "query endpoint returned status code {}: {body}",
                status.as_u16()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| DkgError::Query(format!("invalid query response: {err}")))?;

        match payload.get("data") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(rows)) => rows
                .iter()
                .map(|row| {
                    serde_json::from_value(row.clone()).map_err(|err| {
                        DkgError::Query(format!("unexpected binding row shape: {err}"))
                    })
                })
                .collect(),
            Some(_) => Err(DkgError::Query(
                "unexpected query response shape: data is not an array".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AssetClient for HttpDkgClient {
    async fn create(&self, content: &Value, options: &PublishOptions) -> Result<Value, DkgError> {
        let response = self
            .http
            .post(self.url("/publish"))
            .json(&serde_json::json!({ "content": content, "options": options }))
            .send()
            .await
            .map_err(into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DkgError::Publish(format!(
                "publish endpoint returned status code {}: {body}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|err| DkgError::Publish(format!("invalid publish response: {err}")))
    }

    async fn get(&self, ual: &str) -> Result<Value, DkgError> {
        let response = self
            .http
            .post(self.url("/get"))
            .json(&serde_json::json!({ "id": ual, "contentType": "all" }))
            .send()
            .await
            .map_err(into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DkgError::Query(format!(
                "get endpoint returned status code {}: {body}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|err| DkgError::Query(format!("invalid get response: {err}")))
    }
}

/// Advisory connectivity check used before publishing through a loopback
/// node. Any HTTP answer counts as reachable; only transport failures and
/// the timeout are reported.
pub async fn probe_connectivity(endpoint: &str, timeout: Duration) -> Result<(), DkgError> {
    let client = reqwest::Client::new();
    client
        .get(endpoint)
        .timeout(timeout)
        .send()
        .await
        .map_err(into_network_error)?;
    Ok(())
}

fn into_network_error(err: reqwest::Error) -> DkgError {
    let kind = if err.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        source_io_kind(&err).unwrap_or(io::ErrorKind::Other)
    };
    DkgError::Network {
        kind,
        message: err.to_string(),
    }
}

fn source_io_kind(err: &(dyn std::error::Error + 'static)) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}
