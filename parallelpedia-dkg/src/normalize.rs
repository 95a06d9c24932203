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

//! Normalization of heterogeneous SPARQL result cells.
//!
//! Graph endpoints disagree on how a bound variable is encoded: a plain
//! string, an RDF literal with surrounding quotes and a `^^datatype`
//! annotation, or an object exposing a `value` member. [`SparqlTerm`] makes
//! the shapes explicit and [`normalize`] reduces any of them to a plain
//! string, `""` when the cell is absent. Total for every input shape, and
//! idempotent: normalizing an already-normalized string is the identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One result cell, as deserialized from the query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SparqlTerm {
    /// A bare string cell, possibly carrying RDF literal syntax.
    Literal(String),
    /// An object cell exposing the bound value under a `value` member.
    Wrapped { value: Box<SparqlTerm> },
    /// Any other JSON shape (numbers, booleans).
    Other(Value),
}

/// One result row: variable name to cell.
pub type BindingRow = BTreeMap<String, SparqlTerm>;

impl SparqlTerm {
    /// The raw string carried by the term, before literal cleanup. Used for
    /// identifiers (UALs, asset URIs) that must be passed on verbatim.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            SparqlTerm::Literal(raw) => Some(raw),
            SparqlTerm::Wrapped { value } => value.as_raw(),
            SparqlTerm::Other(Value::String(raw)) => Some(raw),
            SparqlTerm::Other(_) => None,
        }
    }
}

/// Best-effort plain string from a result cell; `""` when absent.
pub fn normalize(term: Option<&SparqlTerm>) -> String {
    match term {
        None => String::new(),
        Some(SparqlTerm::Literal(raw)) => clean_literal(raw),
        Some(SparqlTerm::Wrapped { value }) => normalize(Some(value)),
        Some(SparqlTerm::Other(Value::Null)) => String::new(),
        Some(SparqlTerm::Other(Value::String(raw))) => clean_literal(raw),
        Some(SparqlTerm::Other(other)) => other.to_string(),
    }
}

/// Normalized value of a named variable in a row; `""` when unbound.
pub fn bound(row: &BindingRow, name: &str) -> String {
    normalize(row.get(name))
}

/// Raw (un-normalized) value of a named variable, skipping empty bindings.
pub fn raw_bound(row: &BindingRow, name: &str) -> Option<String> {
    row.get(name)
        .and_then(SparqlTerm::as_raw)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

/// Read-side trust-score parse: floating point, 0 on failure.
pub fn parse_trust_score(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

fn clean_literal(raw: &str) -> String {
    let mut clean = strip_quotes(raw).replace("\\\"", "\"");
    if let Some(idx) = clean.find("^^") {
        // The annotation only counts when text exists on both sides of it.
        if idx > 0 && idx + 2 < clean.len() {
            clean = strip_quotes(&clean[..idx]).to_string();
        }
    }
    clean
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn literal(raw: &str) -> SparqlTerm {
        SparqlTerm::Literal(raw.to_string())
    }

    #[test]
    fn absent_cell_normalizes_to_empty() {
        assert_eq!(normalize(None), "");
    }

    #[test]
    fn plain_string_passes_through() {
        assert_eq!(normalize(Some(&literal("Climate_change"))), "Climate_change");
    }

    #[test]
    fn quoted_typed_literal_is_stripped() {
        let term = literal("\"85\"^^http://www.w3.org/2001/XMLSchema#decimal");
        assert_eq!(normalize(Some(&term)), "85");
    }

    #[test]
    fn escaped_quotes_are_unescaped() {
        let term = literal("\"he said \\\"hi\\\"\"");
        assert_eq!(normalize(Some(&term)), "he said \"hi\"");
    }

    #[test]
    fn wrapped_object_recurses_to_inner_value() {
        let term: SparqlTerm = serde_json::from_value(json!({
            "type": "literal",
            "value": "\"72\"^^xsd:decimal"
        }))
        .unwrap();
        assert_eq!(normalize(Some(&term)), "72");
    }

    #[test]
    fn non_string_cells_display_their_value() {
        let term: SparqlTerm = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(normalize(Some(&term)), "42");
    }

    #[test]
    fn normalization_is_idempotent_across_shapes() {
        let inputs = [
            literal("plain"),
            literal("\"quoted\""),
            literal("\"7.5\"^^xsd:float"),
            serde_json::from_value(json!({ "value": "\"x\"" })).unwrap(),
        ];
        for term in inputs {
            let once = normalize(Some(&term));
            let twice = normalize(Some(&SparqlTerm::Literal(once.clone())));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn annotation_without_trailing_type_is_untouched() {
        assert_eq!(normalize(Some(&literal("x^^"))), "x^^");
    }

    #[test]
    fn raw_bound_skips_empty_and_missing() {
        let mut row = BindingRow::new();
        row.insert("ual".to_string(), literal(""));
        assert_eq!(raw_bound(&row, "ual"), None);
        assert_eq!(raw_bound(&row, "asset"), None);

        row.insert("asset".to_string(), literal("did:dkg:otp/0xabc/1"));
        assert_eq!(raw_bound(&row, "asset").as_deref(), Some("did:dkg:otp/0xabc/1"));
    }

    #[test]
    fn trust_score_parse_defaults_to_zero() {
        assert_eq!(parse_trust_score("72.5"), 72.5);
        assert_eq!(parse_trust_score(" 80 "), 80.0);
        assert_eq!(parse_trust_score(""), 0.0);
        assert_eq!(parse_trust_score("not-a-number"), 0.0);
    }
}
