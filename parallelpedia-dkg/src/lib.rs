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

//! DKG access layer for Community Notes.
//!
//! Everything that touches the decentralized knowledge graph lives here:
//!
//! - [`config`]: the OT-node/blockchain/wallet settings and the
//!   remote-endpoint guard run before every query.
//! - [`sparql`]: SELECT query construction with escaped literals and typed
//!   numeric bounds.
//! - [`normalize`]: turning heterogeneous SPARQL result cells into plain
//!   strings.
//! - [`client`]: the `GraphClient`/`AssetClient` seams and the
//!   reqwest-backed OT-node implementation.
//! - [`service`]: the read/search/publish workflow both the MCP tool
//!   surface and the REST surface call into.
//!
//! Each request is handled independently: no caching, no retries, no shared
//! mutable state beyond the read-only configuration and client handles.

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod service;
pub mod sparql;

pub use client::{probe_connectivity, AssetClient, GraphClient, HttpDkgClient, PublishOptions};
pub use config::DkgConfig;
pub use error::DkgError;
pub use normalize::{normalize, BindingRow, SparqlTerm};
pub use service::{
    FoundNote, GetNoteOutcome, NoteRow, NoteService, PublishError, PublishReceipt, SearchOutcome,
};
pub use sparql::{SearchFilters, DEFAULT_SEARCH_LIMIT};
