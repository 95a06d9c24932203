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

//! MCP surface tests: JSON-RPC handshake and the two note tools.

mod support;

use std::sync::Arc;

use serde_json::{json, Value};

use support::{app_with, localhost_config, remote_config, row, send_rpc, StubAssets, StubGraph};

fn tool_text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn initialize_advertises_tools() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "initialize",
        Some(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "0.0.0" }
        })),
    )
    .await;

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "parallelpedia-mcp");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn ping_answers_with_an_empty_object() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(&app, "ping", None).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn tools_list_contains_both_note_tools() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(&app, "tools/list", None).await;
    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();

    assert_eq!(tools.len(), 2);
    assert!(names.contains(&"get-community-note"));
    assert!(names.contains(&"search-community-notes"));
    for tool in tools {
        assert!(tool["inputSchema"]["type"].as_str() == Some("object"));
    }
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(&app, "resources/list", None).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn get_tool_reports_not_found_inside_the_envelope() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({
            "name": "get-community-note",
            "arguments": { "topicId": "Missing_topic" }
        })),
    )
    .await;

    let envelope = tool_text(&response);
    assert_eq!(envelope["topicId"], "Missing_topic");
    assert_eq!(envelope["found"], false);
    assert!(envelope["message"].as_str().unwrap().contains("No Community Note"));
}

#[tokio::test]
async fn get_tool_found_note_carries_source_assets_and_details() {
    let found = row(&[
        ("trustScore", "72"),
        ("summary", "Mostly consistent"),
        ("createdAt", "2025-11-02T10:00:00.000Z"),
        ("ual", "did:dkg:otp/0xabc/1"),
    ]);
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::new(vec![Ok(vec![found])])),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({
            "name": "get-community-note",
            "arguments": { "topicId": "Climate_change" }
        })),
    )
    .await;

    let envelope = tool_text(&response);
    assert_eq!(envelope["found"], true);
    assert_eq!(envelope["trustScore"], json!(72.0));
    assert_eq!(envelope["ual"], "did:dkg:otp/0xabc/1");
    // The tool surface enriches with asset detail, best-effort.
    assert!(envelope["assetDetails"].is_object());

    let sources = response["result"]["sourceKnowledgeAssets"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["title"], "Community Note: Climate_change");
    assert_eq!(sources[0]["issuer"], "Parallelpedia");
    assert_eq!(sources[0]["ual"], "did:dkg:otp/0xabc/1");
}

#[tokio::test]
async fn get_tool_guard_failure_stays_in_the_envelope() {
    let app = app_with(
        localhost_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({
            "name": "get-community-note",
            "arguments": { "topicId": "Climate_change" }
        })),
    )
    .await;

    // Still a successful JSON-RPC response; the failure is data.
    assert!(response["error"].is_null());
    let envelope = tool_text(&response);
    assert_eq!(envelope["found"], false);
    assert!(envelope["error"].as_str().unwrap().contains("DKG_OTNODE_URL"));
}

#[tokio::test]
async fn get_tool_missing_required_param_is_invalid() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({ "name": "get-community-note", "arguments": {} })),
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::empty()),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({ "name": "delete-community-note", "arguments": {} })),
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("delete-community-note"));
}

#[tokio::test]
async fn search_tool_lists_matching_notes() {
    let matched = row(&[
        ("topicId", "Climate_change"),
        ("trustScore", "\"72\"^^xsd:decimal"),
        ("grokTitle", "Climate change"),
        ("wikiTitle", "Climate change"),
        ("ual", "did:dkg:otp/0xabc/1"),
    ]);
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::new(vec![Ok(vec![matched])])),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({
            "name": "search-community-notes",
            "arguments": { "keyword": "Climate", "minTrustScore": 50 }
        })),
    )
    .await;

    let envelope = tool_text(&response);
    assert_eq!(envelope["found"], true);
    assert_eq!(envelope["count"], 1);
    assert_eq!(envelope["notes"][0]["topicId"], "Climate_change");
    assert_eq!(envelope["notes"][0]["trustScore"], json!(72.0));
    // The tool envelope has no raw asset field; that is REST-only.
    assert!(envelope["notes"][0].get("asset").is_none());
}

#[tokio::test]
async fn search_tool_reports_empty_results_inside_the_envelope() {
    let app = app_with(
        remote_config(),
        Arc::new(StubGraph::new(vec![
            Ok(Vec::new()),
            Ok(Vec::new()),
        ])),
        Arc::new(StubAssets::unused()),
    );

    let response = send_rpc(
        &app,
        "tools/call",
        Some(json!({ "name": "search-community-notes", "arguments": {} })),
    )
    .await;

    let envelope = tool_text(&response);
    assert_eq!(envelope["found"], false);
    assert_eq!(envelope["count"], 0);
    assert_eq!(envelope["notes"], json!([]));
}
