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

//! The Community Note read/search/publish workflow.
//!
//! Both calling surfaces (MCP tools and REST routes) go through
//! [`NoteService`]; the surfaces only differ in how they shape the outcomes
//! returned here. Every operation is stateless and makes a single attempt —
//! failures degrade or surface, they are never retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use parallelpedia_core::{CommunityNote, PublishNoteRequest};

use crate::client::{probe_connectivity, AssetClient, GraphClient, PublishOptions};
use crate::config::DkgConfig;
use crate::error::{self, DkgError};
use crate::normalize::{bound, parse_trust_score, raw_bound, BindingRow};
use crate::sparql::{self, SearchFilters};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// A note found by [`NoteService::get_note`], with any extra asset detail
/// fetched best-effort.
#[derive(Debug, Clone)]
pub struct FoundNote {
    pub note: CommunityNote,
    pub asset_details: Option<Value>,
}

/// Outcome of a single-topic lookup. Query failures are an outcome, not an
/// error: the surfaces degrade them to a not-found response.
#[derive(Debug, Clone)]
pub enum GetNoteOutcome {
    Found(FoundNote),
    NotFound,
    QueryFailed(String),
}

/// One search result row. `asset` is the raw asset URI bound by the query,
/// kept separate because only the REST search response exposes it.
#[derive(Debug, Clone)]
pub struct NoteRow {
    pub note: CommunityNote,
    pub asset: Option<String>,
}

/// Outcome of a search. A failed query degrades to an empty list with the
/// raw upstream message attached; surfaces decide what is safe to disclose.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Results(Vec<NoteRow>),
    QueryFailed(String),
}

/// Successful publish: the assigned asset locator plus whatever operation
/// identifiers the node response carried.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub ual: String,
    pub operation_id: Option<String>,
    pub transaction_hash: Option<String>,
}

/// Terminal publish failures. Every variant maps to a 500-class response;
/// the caller is expected to fix configuration and retry.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("{0}")]
    Configuration(String),

    /// The node accepted the call but reported failure inside the result
    /// payload.
    #[error("{0}")]
    Rejected(String),

    /// The create call itself failed.
    #[error("{0}")]
    Failed(String),

    /// Create apparently succeeded but no asset identifier could be located
    /// in the response.
    #[error("no UAL returned by the create operation")]
    MissingIdentifier { response: Value },
}

pub struct NoteService {
    config: DkgConfig,
    graph: Arc<dyn GraphClient>,
    assets: Arc<dyn AssetClient>,
}

impl NoteService {
    pub fn new(config: DkgConfig, graph: Arc<dyn GraphClient>, assets: Arc<dyn AssetClient>) -> Self {
        Self {
            config,
            graph,
            assets,
        }
    }

    pub fn config(&self) -> &DkgConfig {
        &self.config
    }

    /// Look up the most recent note for a topic.
    ///
    /// Errors only on guard failure (`DkgError::Configuration`); everything
    /// downstream of the guard is an outcome. `with_details` additionally
    /// fetches full asset metadata when the query bound an identifier; only
    /// the agent-tool surface asks for it.
    pub async fn get_note(
        &self,
        topic_id: &str,
        with_details: bool,
    ) -> Result<GetNoteOutcome, DkgError> {
        self.config.validate_remote_endpoint()?;

        let query = sparql::get_note_query(topic_id);
        debug!(topic_id, "running community-note lookup");

        let rows = match self.graph.query_select(&query).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(topic_id, error = %err, "community-note lookup failed");
                return Ok(GetNoteOutcome::QueryFailed(err.to_string()));
            }
        };

        let Some(row) = rows.first() else {
            return Ok(GetNoteOutcome::NotFound);
        };

        let ual = raw_bound(row, "ual").or_else(|| raw_bound(row, "asset"));

        let asset_details = match ual.as_deref().filter(|_| with_details) {
            Some(ual) => match self.assets.get(ual).await {
                Ok(details) => Some(details),
                Err(err) => {
                    // Extra detail is best-effort; the note itself still
                    // comes back from the query bindings.
                    warn!(ual, error = %err, "could not fetch full asset details");
                    None
                }
            },
            None => None,
        };

        let note = note_from_row(row, topic_id, ual);
        Ok(GetNoteOutcome::Found(FoundNote {
            note,
            asset_details,
        }))
    }

    /// Search notes by keyword and trust-score range, newest first.
    pub async fn search_notes(&self, filters: &SearchFilters) -> Result<SearchOutcome, DkgError> {
        self.config.validate_remote_endpoint()?;

        let query = sparql::search_query(filters);
        debug!(?filters, "running community-note search");

        let mut rows = match self.graph.query_select(&query).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "community-note search failed");
                return Ok(SearchOutcome::QueryFailed(err.to_string()));
            }
        };

        // Some nodes never bind the asset type; an unfiltered search that
        // found nothing retries once without the type constraint.
        if rows.is_empty() && !filters.has_filters() {
            info!("typed search returned nothing, trying the untyped fallback");
            match self
                .graph
                .query_select(&sparql::fallback_search_query(filters.limit()))
                .await
            {
                Ok(fallback) if !fallback.is_empty() => {
                    info!(count = fallback.len(), "fallback query matched");
                    rows = fallback;
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "fallback query failed"),
            }
        }

        let results = rows
            .iter()
            .map(|row| {
                let asset = raw_bound(row, "asset");
                let ual = raw_bound(row, "ual").or_else(|| asset.clone());
                NoteRow {
                    note: note_from_row(row, "", ual),
                    asset,
                }
            })
            .collect();

        Ok(SearchOutcome::Results(results))
    }

    /// Publish a note as a new knowledge asset.
    ///
    /// The request is assumed validated (trust-score domain) by the caller;
    /// this method checks configuration, builds the JSON-LD document, and
    /// classifies whatever the create call produced.
    pub async fn publish_note(
        &self,
        request: &PublishNoteRequest,
    ) -> Result<PublishReceipt, PublishError> {
        let settings = self
            .config
            .require_publish_settings()
            .map_err(|err| PublishError::Configuration(err.to_string()))?;

        info!(
            topic_id = %request.topic_id,
            endpoint = settings.endpoint,
            blockchain = settings.blockchain,
            "publishing community note"
        );

        let jsonld = request.to_json_ld(Utc::now());
        let wrapped = serde_json::json!({ "public": jsonld });

        if self.config.is_loopback_endpoint() {
            warn!(endpoint = settings.endpoint, "publishing through a loopback OT-node");
            match probe_connectivity(settings.endpoint, PROBE_TIMEOUT).await {
                Ok(()) => debug!("OT-node connectivity probe passed"),
                Err(err) => {
                    warn!(error = %err, "OT-node connectivity probe failed, proceeding with publish attempt")
                }
            }
        }

        let response = match self.assets.create(&wrapped, &PublishOptions::default()).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "asset create call failed");
                let detail = error::describe_create_error(&err, &self.config);
                let message = if error::is_funding_error(&detail) {
                    error::funding_shortfall_message(&detail)
                } else {
                    format!("Unable to publish: {detail}")
                };
                return Err(PublishError::Failed(message));
            }
        };

        if let Some(op_error) = operation_error(&response) {
            error!(
                error_type = %op_error.error_type,
                message = %op_error.message,
                "node reported a publish error inside the result payload"
            );
            return Err(PublishError::Rejected(op_error.into_message()));
        }

        let Some(ual) = extract_ual(&response) else {
            error!("asset created but no UAL found in the response");
            return Err(PublishError::MissingIdentifier { response });
        };

        info!(%ual, "community note published");
        Ok(PublishReceipt {
            operation_id: string_at(&response, &["operation", "publish", "operationId"]),
            transaction_hash: string_at(
                &response,
                &["operation", "mintKnowledgeCollection", "transactionHash"],
            ),
            ual,
        })
    }
}

fn note_from_row(row: &BindingRow, requested_topic: &str, ual: Option<String>) -> CommunityNote {
    let topic_id = match bound(row, "topicId") {
        topic if topic.is_empty() => requested_topic.to_string(),
        topic => topic,
    };

    CommunityNote {
        topic_id,
        trust_score: parse_trust_score(&bound(row, "trustScore")),
        summary: bound(row, "summary"),
        grok_title: bound(row, "grokTitle"),
        wiki_title: bound(row, "wikiTitle"),
        created_at: bound(row, "createdAt"),
        ual,
    }
}

struct OperationError {
    error_type: String,
    message: String,
    operation_id: Option<String>,
    status: Option<String>,
}

impl OperationError {
    fn into_message(self) -> String {
        let combined = format!("{} {}", self.error_type, self.message);
        if error::is_funding_error(&combined) {
            error::funding_shortfall_message(&format!("{} - {}", self.error_type, self.message))
        } else {
            format!(
                "Unable to publish: {} - {}. Operation ID: {}, Status: {}. Check the node logs \
                 for full details.",
                self.error_type,
                self.message,
                self.operation_id.as_deref().unwrap_or("unknown"),
                self.status.as_deref().unwrap_or("unknown"),
            )
        }
    }
}

/// The node's error channel is the result value: a completed create call can
/// still carry `operation.publish.errorType` / `errorMessage`.
fn operation_error(response: &Value) -> Option<OperationError> {
    let publish = response.get("operation")?.get("publish")?;
    let error_type = publish.get("errorType").and_then(Value::as_str);
    let message = publish.get("errorMessage").and_then(Value::as_str);
    if error_type.is_none() && message.is_none() {
        return None;
    }

    Some(OperationError {
        error_type: error_type.unwrap_or_default().to_string(),
        message: message.unwrap_or_default().to_string(),
        operation_id: publish
            .get("operationId")
            .and_then(Value::as_str)
            .map(str::to_string),
        status: publish
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// The asset locator can come back under several names depending on the node
/// version; check them in a fixed priority order.
fn extract_ual(response: &Value) -> Option<String> {
    ["UAL", "ual", "asset_id", "dataSetId"]
        .iter()
        .find_map(|key| response.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| string_at(response, &["operation", "publish", "ual"]))
        .filter(|ual| !ual.is_empty())
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_string)
}
