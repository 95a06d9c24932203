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

//! SPARQL SELECT construction for Community Note reads.
//!
//! String values pass through [`escape_literal`] before they are placed
//! into a query; numeric bounds and limits are typed so no caller-supplied
//! string can reach a numeric position.

/// Default result limit when the caller does not supply one.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

const PREFIXES: &str = "PREFIX schema: <https://schema.org/>\n\
                        PREFIX parallelpedia: <https://parallelpedia.org/schema/>\n";

/// Escape a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Search filters accepted by both calling surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub keyword: Option<String>,
    pub min_trust_score: Option<f64>,
    pub max_trust_score: Option<f64>,
    pub limit: Option<usize>,
}

impl SearchFilters {
    /// The keyword filter, with empty strings treated as unset.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().filter(|keyword| !keyword.is_empty())
    }

    /// Whether any filter narrows the search. Controls fallback eligibility:
    /// only an unfiltered search that found nothing retries without the type
    /// constraint.
    pub fn has_filters(&self) -> bool {
        self.keyword().is_some()
            || self.min_trust_score.is_some()
            || self.max_trust_score.is_some()
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

/// Exact-match lookup of the most recent note for one topic.
pub fn get_note_query(topic_id: &str) -> String {
    format!(
        "{PREFIXES}\n\
         SELECT ?asset ?ual ?trustScore ?summary ?grokTitle ?wikiTitle ?createdAt WHERE {{\n\
         \x20 ?asset a schema:CommunityNote .\n\
         \x20 ?asset schema:topicId \"{topic}\" .\n\
         \x20 ?asset schema:trustScore ?trustScore .\n\
         \x20 OPTIONAL {{ ?asset schema:summary ?summary . }}\n\
         \x20 OPTIONAL {{ ?asset schema:grokTitle ?grokTitle . }}\n\
         \x20 OPTIONAL {{ ?asset schema:wikiTitle ?wikiTitle . }}\n\
         \x20 OPTIONAL {{ ?asset schema:dateCreated ?createdAt . }}\n\
         \x20 OPTIONAL {{ ?asset schema:identifier ?ual . }}\n\
         }}\n\
         ORDER BY DESC(?createdAt)\n\
         LIMIT 1\n",
        topic = escape_literal(topic_id)
    )
}

/// Filtered search across all notes, newest first.
pub fn search_query(filters: &SearchFilters) -> String {
    let mut query = format!(
        "{PREFIXES}\n\
         SELECT ?asset ?ual ?topicId ?trustScore ?summary ?grokTitle ?wikiTitle ?createdAt WHERE {{\n\
         \x20 ?asset a schema:CommunityNote .\n\
         \x20 ?asset schema:topicId ?topicId .\n\
         \x20 ?asset schema:trustScore ?trustScore .\n\
         \x20 OPTIONAL {{ ?asset schema:summary ?summary . }}\n\
         \x20 OPTIONAL {{ ?asset schema:grokTitle ?grokTitle . }}\n\
         \x20 OPTIONAL {{ ?asset schema:wikiTitle ?wikiTitle . }}\n\
         \x20 OPTIONAL {{ ?asset schema:dateCreated ?createdAt . }}\n\
         \x20 OPTIONAL {{ ?asset schema:identifier ?ual . }}\n"
    );

    if let Some(keyword) = filters.keyword() {
        let keyword = escape_literal(keyword);
        query.push_str(&format!(
            "  FILTER (\n\
             \x20   CONTAINS(LCASE(?topicId), LCASE(\"{keyword}\")) ||\n\
             \x20   CONTAINS(LCASE(?grokTitle), LCASE(\"{keyword}\")) ||\n\
             \x20   CONTAINS(LCASE(?wikiTitle), LCASE(\"{keyword}\"))\n\
             \x20 )\n"
        ));
    }

    if let Some(min) = filters.min_trust_score {
        query.push_str(&format!("  FILTER (?trustScore >= {min})\n"));
    }

    if let Some(max) = filters.max_trust_score {
        query.push_str(&format!("  FILTER (?trustScore <= {max})\n"));
    }

    query.push_str(&format!(
        "}}\nORDER BY DESC(?createdAt)\nLIMIT {}\n",
        filters.limit()
    ));
    query
}

/// Untyped fallback for an unfiltered search that found nothing.
///
/// Some nodes do not expose the asset type at the graph layer, so this shape
/// drops the type constraint and keeps a trust-score range filter as the
/// note discriminator.
pub fn fallback_search_query(limit: usize) -> String {
    format!(
        "{PREFIXES}\n\
         SELECT ?asset ?ual ?topicId ?trustScore ?summary ?grokTitle ?wikiTitle ?createdAt WHERE {{\n\
         \x20 ?asset schema:trustScore ?trustScore .\n\
         \x20 ?asset schema:topicId ?topicId .\n\
         \x20 OPTIONAL {{ ?asset schema:summary ?summary . }}\n\
         \x20 OPTIONAL {{ ?asset schema:grokTitle ?grokTitle . }}\n\
         \x20 OPTIONAL {{ ?asset schema:wikiTitle ?wikiTitle . }}\n\
         \x20 OPTIONAL {{ ?asset schema:dateCreated ?createdAt . }}\n\
         \x20 OPTIONAL {{ ?asset schema:identifier ?ual . }}\n\
         \x20 FILTER (?trustScore >= 0 && ?trustScore <= 100)\n\
         }}\n\
         ORDER BY DESC(?createdAt)\n\
         LIMIT {limit}\n"
    )
}
