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

//! Model Context Protocol (MCP) surface.
//!
//! Exposes the Community Note capability to AI agents over JSON-RPC 2.0:
//!
//! - **Tools**: `get-community-note` and `search-community-notes`
//!
//! Tool results are the note envelopes serialized as a single text content
//! item; a found note additionally cross-references its knowledge asset so
//! downstream agents can attribute what they cite. Tool input schemas are
//! compiled at registration time and every call is validated against them
//! before it reaches a tool.

pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod tools;

pub use handlers::McpHandler;
pub use protocol::*;
pub use registry::{McpTool, RegistrationError, ToolError, ToolRegistry};
pub use router::mcp_router;
pub use tools::register_note_tools;
