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

//! Write-side payload for publishing a Community Note.
//!
//! The publish route accepts this body, validates the trust-score domain,
//! and turns it into a JSON-LD document with a schema.org vocabulary plus
//! the `parallelpedia` extension namespace. `dateCreated` is stamped at
//! publish time, never caller-supplied.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// schema.org default vocabulary for the JSON-LD `@context`.
pub const SCHEMA_ORG_VOCAB: &str = "https://schema.org/";

/// Parallelpedia extension namespace for the JSON-LD `@context`.
pub const PARALLELPEDIA_NAMESPACE: &str = "https://parallelpedia.org/schema/";

/// JSON-LD `@type` of every published note.
pub const NOTE_TYPE: &str = "CommunityNote";

/// A single discrepancy example attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyExample {
    pub text: String,
    pub label: String,
}

/// Source URLs and asset locators backing a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grok_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grok_ual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_ual: Option<String>,
}

/// Opaque provenance metadata. Carried through to the published document
/// verbatim, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<ProvenanceSources>,
}

/// Body of `POST /parallelpedia/community-notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishNoteRequest {
    pub topic_id: String,
    pub trust_score: f64,
    pub summary: String,
    pub labels_count: BTreeMap<String, u64>,
    #[serde(default)]
    pub key_examples: Vec<KeyExample>,
    pub grok_title: String,
    pub wiki_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("trustScore must be between 0 and 100, got {0}")]
    TrustScoreOutOfRange(f64),
}

impl PublishNoteRequest {
    /// Validate the write-side domain constraints before anything reaches
    /// the network layer.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.trust_score.is_finite() || !(0.0..=100.0).contains(&self.trust_score) {
            return Err(ValidationError::TrustScoreOutOfRange(self.trust_score));
        }
        Ok(())
    }

    /// Build the JSON-LD document published as the note's knowledge asset.
    ///
    /// Absent provenance becomes an empty object rather than being dropped,
    /// keeping the published document shape stable across writers.
    pub fn to_json_ld(&self, date_created: DateTime<Utc>) -> Value {
        let provenance = match &self.provenance {
            Some(p) => serde_json::to_value(p).unwrap_or_else(|_| json!({})),
            None => json!({}),
        };

        json!({
            "@context": {
                "@vocab": SCHEMA_ORG_VOCAB,
                "parallelpedia": PARALLELPEDIA_NAMESPACE,
            },
            "@type": NOTE_TYPE,
            "topicId": self.topic_id,
            "trustScore": self.trust_score,
            "summary": self.summary,
            "labelsCount": self.labels_count,
            "keyExamples": self.key_examples,
            "grokTitle": self.grok_title,
            "wikiTitle": self.wiki_title,
            "dateCreated": date_created.to_rfc3339_opts(SecondsFormat::Millis, true),
            "provenance": provenance,
        })
    }
}
