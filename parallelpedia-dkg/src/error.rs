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

//! Error taxonomy for the DKG access layer, plus the publish-failure
//! message classification.
//!
//! Publish failures carry the most operator value, so the helpers here turn
//! whatever the node or the network produced into the most specific message
//! available: funding-shortfall vocabulary, known network error kinds naming
//! the configured endpoint, or a troubleshooting checklist when nothing
//! better can be extracted.

use std::io;

use thiserror::Error;

use crate::config::{
    DkgConfig, ENV_BLOCKCHAIN, ENV_OTNODE_URL, ENV_PUBLISH_WALLET, EXAMPLE_REMOTE_NODE,
};

#[derive(Debug, Error)]
pub enum DkgError {
    /// Missing or invalid settings. Always surfaced to the caller with an
    /// actionable message; blocks the operation entirely.
    #[error("{0}")]
    Configuration(String),

    /// The graph query failed upstream or returned an unusable payload.
    #[error("{0}")]
    Query(String),

    /// A network-level failure reaching the node. The underlying I/O error
    /// kind is kept so publish failures can be classified.
    #[error("{message}")]
    Network { kind: io::ErrorKind, message: String },

    /// The node answered a publish call with a non-success status or an
    /// unusable body.
    #[error("{0}")]
    Publish(String),
}

/// Whether an upstream error message reflects a generic HTTP-500 condition.
/// Such messages are scrubbed from caller-visible responses while the full
/// detail is logged server-side.
pub fn reflects_upstream_500(message: &str) -> bool {
    message.contains("500")
}

/// Whether error text matches the blockchain funding-shortfall vocabulary.
pub fn is_funding_error(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    [
        "revert",
        "insufficient funds",
        "vm exception",
        "execution reverted",
        "gas",
        "balance",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}

/// Funding-shortfall publish failure, with the remedy spelled out.
pub fn funding_shortfall_message(detail: &str) -> String {
    format!(
        "Unable to publish: blockchain transaction failed. The publishing wallet likely needs \
         testnet tokens (NEURO) to pay for gas fees. Error: {detail}. To fix: request testnet \
         tokens from the OriginTrail community for the wallet address."
    )
}

/// Map a known network error kind to an operator-actionable message naming
/// the configured endpoint.
pub fn describe_network_error(kind: io::ErrorKind, message: &str, endpoint: &str) -> String {
    match kind {
        io::ErrorKind::ConnectionRefused => format!(
            "Cannot connect to the OT-node at {endpoint}. The node is not running or not \
             accessible. For testnet, use: {EXAMPLE_REMOTE_NODE}"
        ),
        io::ErrorKind::TimedOut => {
            "Connection to the DKG node timed out. Check network connectivity.".to_string()
        }
        io::ErrorKind::ConnectionReset => "Connection to the DKG node was reset.".to_string(),
        _ if message.contains("dns error") || message.contains("failed to lookup") => format!(
            "DKG node hostname could not be resolved. Check {ENV_OTNODE_URL}: {endpoint}"
        ),
        _ => format!("Network error reaching {endpoint}: {message}"),
    }
}

/// Multi-section fallback emitted when no specific failure cause could be
/// extracted. States current configuration without revealing the wallet key.
pub fn troubleshooting_checklist(config: &DkgConfig) -> String {
    let endpoint = config.endpoint_display();
    let blockchain = config.blockchain.as_deref().unwrap_or("NOT SET");
    let wallet = if config.publish_wallet.is_some() {
        "SET (hidden)"
    } else {
        "NOT SET"
    };

    format!(
        "Unable to publish: the node client returned no error detail. This usually indicates \
         one of the following issues:\n\n\
         1. OT-node connection: the node cannot be reached.\n\
            - Is {ENV_OTNODE_URL} set correctly? (Current: {endpoint})\n\
            - Is the OT-node running and accessible?\n\
            - For testnet, use: {EXAMPLE_REMOTE_NODE}\n\n\
         2. Wallet configuration: {ENV_PUBLISH_WALLET} is {wallet}.\n\n\
         3. Blockchain configuration: {ENV_BLOCKCHAIN} is {blockchain}.\n\n\
         4. Network issues: check firewall and connectivity to the OT-node.\n\n\
         Check the node logs for more detail."
    )
}

/// Best-effort extraction of a human-readable cause from a failed create
/// call: network error kinds first, then whatever message the error carries,
/// then the troubleshooting checklist.
pub fn describe_create_error(err: &DkgError, config: &DkgConfig) -> String {
    let endpoint = config.endpoint_display();
    match err {
        DkgError::Network { kind, message } => describe_network_error(*kind, message, endpoint),
        DkgError::Configuration(message) | DkgError::Query(message) | DkgError::Publish(message) => {
            if message.trim().is_empty() {
                troubleshooting_checklist(config)
            } else {
                message.clone()
            }
        }
    }
}
