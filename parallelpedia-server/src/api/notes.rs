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

//! Community Note routes.
//!
//! Status mapping follows the note service outcomes: guard failures are 400,
//! a missing note or failed lookup is 404, search always answers 200 with a
//! degraded empty body on upstream failure, and every publish failure is
//! 500. Raw upstream query errors are logged but never disclosed; callers
//! see a canned message, scrubbed to `""` entirely when the upstream failure
//! was a generic 500.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::error;

use parallelpedia_core::PublishNoteRequest;
use parallelpedia_dkg::{
    error::reflects_upstream_500, GetNoteOutcome, NoteRow, PublishError, SearchFilters,
    SearchOutcome,
};

use crate::api::{ApiError, AppState};

const GET_QUERY_FAILED_MESSAGE: &str =
    "SPARQL query failed. The data may not be indexed yet, or the query syntax may need adjustment.";
const SEARCH_QUERY_FAILED_MESSAGE: &str = "SPARQL query failed. The data may not be indexed yet.";

/// GET /parallelpedia/community-notes/:topicId
pub async fn get_note(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Response {
    match state.notes.get_note(&topic_id, false).await {
        Err(err) => {
            error!(topic_id = %topic_id, error = %err, "remote OT-node validation failed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "topicId": topic_id, "found": false, "error": err.to_string() })),
            )
                .into_response()
        }
        Ok(GetNoteOutcome::QueryFailed(message)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "topicId": topic_id,
                "found": false,
                "error": scrub_query_error(&message, GET_QUERY_FAILED_MESSAGE),
            })),
        )
            .into_response(),
        Ok(GetNoteOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "topicId": topic_id, "found": false })),
        )
            .into_response(),
        Ok(GetNoteOutcome::Found(found)) => {
            let note = found.note;
            Json(json!({
                "topicId": note.topic_id,
                "found": true,
                "trustScore": note.trust_score,
                "summary": note.summary,
                "grokTitle": note.grok_title,
                "wikiTitle": note.wiki_title,
                "createdAt": note.created_at,
                "ual": note.ual,
            }))
            .into_response()
        }
    }
}

/// Query parameters for GET /parallelpedia/community-notes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub min_trust_score: Option<f64>,
    pub max_trust_score: Option<f64>,
    pub limit: Option<usize>,
}

impl From<SearchParams> for SearchFilters {
    fn from(params: SearchParams) -> Self {
        SearchFilters {
            keyword: params.keyword,
            min_trust_score: params.min_trust_score,
            max_trust_score: params.max_trust_score,
            limit: params.limit,
        }
    }
}

/// GET /parallelpedia/community-notes
pub async fn search_notes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let filters = SearchFilters::from(params);

    match state.notes.search_notes(&filters).await {
        Err(err) => {
            error!(error = %err, "remote OT-node validation failed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "found": false,
                    "count": 0,
                    "notes": [],
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
        Ok(SearchOutcome::QueryFailed(message)) => Json(json!({
            "found": false,
            "count": 0,
            "notes": [],
            "error": scrub_query_error(&message, SEARCH_QUERY_FAILED_MESSAGE),
        }))
        .into_response(),
        Ok(SearchOutcome::Results(rows)) if rows.is_empty() => {
            Json(json!({ "found": false, "count": 0, "notes": [] })).into_response()
        }
        Ok(SearchOutcome::Results(rows)) => {
            let notes: Vec<Value> = rows.iter().map(search_row_json).collect();
            Json(json!({ "found": true, "count": notes.len(), "notes": notes })).into_response()
        }
    }
}

/// POST /parallelpedia/community-notes
pub async fn publish_note(
    State(state): State<AppState>,
    Json(request): Json<PublishNoteRequest>,
) -> Response {
    if let Err(err) = request.validate() {
        return ApiError::BadRequest(err.to_string()).into_response();
    }

    match state.notes.publish_note(&request).await {
        Ok(receipt) => {
            let mut body = Map::new();
            body.insert("success".to_string(), json!(true));
            body.insert("ual".to_string(), json!(receipt.ual));
            body.insert("asset_id".to_string(), json!(receipt.ual));
            body.insert("error".to_string(), Value::Null);
            body.insert(
                "verification_url".to_string(),
                json!(format!("/api/dkg/assets?ual={}", receipt.ual)),
            );
            if let Some(operation_id) = receipt.operation_id {
                body.insert("operation_id".to_string(), json!(operation_id));
            }
            if let Some(transaction_hash) = receipt.transaction_hash {
                body.insert("transaction_hash".to_string(), json!(transaction_hash));
            }
            Json(Value::Object(body)).into_response()
        }
        Err(PublishError::MissingIdentifier { response }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "ual": null,
                "error": "Failed to create knowledge asset - no UAL returned. \
                          Check the node logs for the full response.",
                "full_response": response,
            })),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "ual": null, "error": err.to_string() })),
        )
            .into_response(),
    }
}

fn search_row_json(row: &NoteRow) -> Value {
    json!({
        "topicId": row.note.topic_id,
        "trustScore": row.note.trust_score,
        "summary": row.note.summary,
        "grokTitle": row.note.grok_title,
        "wikiTitle": row.note.wiki_title,
        "createdAt": row.note.created_at,
        "ual": row.note.ual,
        "asset": row.asset,
    })
}

/// Upstream 500s carry internal operational noise; scrub them entirely.
/// Anything else becomes a canned hint without the raw upstream text.
fn scrub_query_error(message: &str, canned: &str) -> String {
    if reflects_upstream_500(message) {
        String::new()
    } else {
        canned.to_string()
    }
}
