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

//! Community Note MCP tools.
//!
//! Both tools mirror the REST routes but keep the agent-tool envelope: a
//! single JSON text content item that always carries `found`, never an HTTP
//! status. Failures — guard rejections included — come back inside the
//! envelope so an agent can always parse the result.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use parallelpedia_dkg::{
    GetNoteOutcome, NoteService, SearchFilters, SearchOutcome,
};

use crate::mcp::protocol::{CallToolResult, SourceKnowledgeAsset};
use crate::mcp::registry::{McpTool, RegistrationError, ToolError, ToolRegistry};

pub const GET_COMMUNITY_NOTE: &str = "get-community-note";
pub const SEARCH_COMMUNITY_NOTES: &str = "search-community-notes";

const NOTE_NOT_FOUND_MESSAGE: &str =
    "No Community Note found for this topic. You may want to create one first.";
const SEARCH_EMPTY_MESSAGE: &str = "No Community Notes found matching the criteria.";

/// Register both Community Note tools on a registry.
pub fn register_note_tools(
    registry: &ToolRegistry,
    service: Arc<NoteService>,
) -> Result<(), RegistrationError> {
    registry.register(Arc::new(GetCommunityNoteTool::new(service.clone())))?;
    registry.register(Arc::new(SearchCommunityNotesTool::new(service)))?;
    Ok(())
}

// =============================================================================
// get-community-note
// =============================================================================

pub struct GetCommunityNoteTool {
    service: Arc<NoteService>,
    schema: Value,
}

impl GetCommunityNoteTool {
    pub fn new(service: Arc<NoteService>) -> Self {
        Self {
            service,
            schema: json!({
                "type": "object",
                "properties": {
                    "topicId": {
                        "type": "string",
                        "description": "Topic identifier (e.g., 'Climate_change', 'Artificial_intelligence')"
                    }
                },
                "required": ["topicId"]
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetNoteParams {
    #[serde(rename = "topicId")]
    topic_id: String,
}

#[async_trait]
impl McpTool for GetCommunityNoteTool {
    fn name(&self) -> &str {
        GET_COMMUNITY_NOTE
    }

    fn description(&self) -> &str {
        "Retrieve a Community Note for a specific topic comparing Grokipedia vs Wikipedia. \
         Returns trust score, summary, and key discrepancies found."
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value) -> Result<CallToolResult, ToolError> {
        let params: GetNoteParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        let topic_id = params.topic_id;

        let envelope = match self.service.get_note(&topic_id, true).await {
            Err(err) => {
                warn!(topic_id = %topic_id, error = %err, "remote OT-node validation failed");
                json!({ "topicId": topic_id, "found": false, "error": err.to_string() })
            }
            Ok(GetNoteOutcome::QueryFailed(_)) | Ok(GetNoteOutcome::NotFound) => {
                json!({ "topicId": topic_id, "found": false, "message": NOTE_NOT_FOUND_MESSAGE })
            }
            Ok(GetNoteOutcome::Found(found)) => {
                let note = &found.note;
                let sources = note
                    .ual
                    .as_ref()
                    .map(|ual| {
                        vec![SourceKnowledgeAsset {
                            title: note.source_asset_title(),
                            issuer: "Parallelpedia".to_string(),
                            ual: ual.clone(),
                        }]
                    })
                    .unwrap_or_default();

                let envelope = json!({
                    "topicId": note.topic_id,
                    "found": true,
                    "trustScore": note.trust_score,
                    "summary": note.summary,
                    "grokTitle": note.grok_title,
                    "wikiTitle": note.wiki_title,
                    "createdAt": note.created_at,
                    "ual": note.ual,
                    "assetDetails": found.asset_details,
                });
                return Ok(serialized(&envelope)?.with_sources(sources));
            }
        };

        Ok(serialized(&envelope)?)
    }
}

// =============================================================================
// search-community-notes
// =============================================================================

pub struct SearchCommunityNotesTool {
    service: Arc<NoteService>,
    schema: Value,
}

impl SearchCommunityNotesTool {
    pub fn new(service: Arc<NoteService>) -> Self {
        Self {
            service,
            schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "Search keyword to match against topic IDs or titles"
                    },
                    "minTrustScore": {
                        "type": "number",
                        "description": "Minimum trust score (0-100)"
                    },
                    "maxTrustScore": {
                        "type": "number",
                        "description": "Maximum trust score (0-100)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results to return",
                        "default": 10
                    }
                }
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchNotesParams {
    keyword: Option<String>,
    #[serde(rename = "minTrustScore")]
    min_trust_score: Option<f64>,
    #[serde(rename = "maxTrustScore")]
    max_trust_score: Option<f64>,
    limit: Option<usize>,
}

#[async_trait]
impl McpTool for SearchCommunityNotesTool {
    fn name(&self) -> &str {
        SEARCH_COMMUNITY_NOTES
    }

    fn description(&self) -> &str {
        "Search for Community Notes by topic keywords or filter by trust score range. \
         Returns a list of matching Community Notes."
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value) -> Result<CallToolResult, ToolError> {
        let params: SearchNotesParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        let filters = SearchFilters {
            keyword: params.keyword,
            min_trust_score: params.min_trust_score,
            max_trust_score: params.max_trust_score,
            limit: params.limit,
        };

        let envelope = match self.service.search_notes(&filters).await {
            Err(err) => {
                warn!(error = %err, "remote OT-node validation failed");
                json!({ "found": false, "count": 0, "notes": [], "error": err.to_string() })
            }
            Ok(SearchOutcome::QueryFailed(_)) => {
                json!({ "found": false, "count": 0, "notes": [], "message": SEARCH_EMPTY_MESSAGE })
            }
            Ok(SearchOutcome::Results(rows)) if rows.is_empty() => {
                json!({ "found": false, "count": 0, "notes": [], "message": SEARCH_EMPTY_MESSAGE })
            }
            Ok(SearchOutcome::Results(rows)) => {
                let notes: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        json!({
                            "topicId": row.note.topic_id,
                            "trustScore": row.note.trust_score,
                            "summary": row.note.summary,
                            "grokTitle": row.note.grok_title,
                            "wikiTitle": row.note.wiki_title,
                            "createdAt": row.note.created_at,
                            "ual": row.note.ual,
                        })
                    })
                    .collect();
                json!({ "found": true, "count": notes.len(), "notes": notes })
            }
        };

        Ok(serialized(&envelope)?)
    }
}

fn serialized(envelope: &Value) -> Result<CallToolResult, ToolError> {
    serde_json::to_string_pretty(envelope)
        .map(CallToolResult::text)
        .map_err(|e| ToolError::Execution(e.to_string()))
}
