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

//! Core domain model for Parallelpedia Community Notes.
//!
//! A Community Note is a structured comparison between two encyclopedia
//! sources (Grokipedia vs Wikipedia) for one topic: a trust score, a summary
//! of discrepancies, label counts, and key examples. Notes are published to
//! the DKG as immutable knowledge assets and read back via SPARQL; this crate
//! holds the record types, write-side payload validation, and the JSON-LD
//! envelope construction used by the publish path.

pub mod note;
pub mod publish;

pub use note::CommunityNote;
pub use publish::{
    KeyExample, Provenance, ProvenanceSources, PublishNoteRequest, ValidationError,
    NOTE_TYPE, PARALLELPEDIA_NAMESPACE, SCHEMA_ORG_VOCAB,
};
