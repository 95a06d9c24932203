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

use serde::{Deserialize, Serialize};

/// A Community Note as read back from the DKG.
///
/// All descriptive fields come out of SPARQL bindings already normalized to
/// plain strings; missing optional fields are empty strings, matching what
/// callers of both surfaces receive. `ual` is the asset locator assigned at
/// publish time and is `None` when the graph did not bind one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityNote {
    pub topic_id: String,
    pub trust_score: f64,
    pub summary: String,
    pub grok_title: String,
    pub wiki_title: String,
    pub created_at: String,
    pub ual: Option<String>,
}

impl CommunityNote {
    /// Title used when cross-referencing this note as a source knowledge
    /// asset for agent attribution.
    pub fn source_asset_title(&self) -> String {
        format!("Community Note: {}", self.topic_id)
    }
}
