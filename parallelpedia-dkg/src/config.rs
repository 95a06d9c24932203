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

//! DKG connection settings and the remote-endpoint guard.
//!
//! Settings are loaded once at process start (config file plus env
//! overrides) and passed by reference into the note service; nothing reads
//! the process environment at call time.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DkgError;

/// OT-node HTTP endpoint, e.g. `https://v6-pegasus-node-02.origin-trail.network:8900`.
pub const ENV_OTNODE_URL: &str = "DKG_OTNODE_URL";

/// Blockchain network identifier, e.g. `otp:20430` (testnet) or `otp:2043` (mainnet).
pub const ENV_BLOCKCHAIN: &str = "DKG_BLOCKCHAIN";

/// Private key of the wallet that signs publish transactions.
pub const ENV_PUBLISH_WALLET: &str = "DKG_PUBLISH_WALLET";

/// Remote node suggested in operator-facing messages.
pub const EXAMPLE_REMOTE_NODE: &str = "https://v6-pegasus-node-02.origin-trail.network:8900";

/// DKG network access configuration.
///
/// All three settings are optional at load time; the read paths require a
/// remote `otnode_url` and the publish path requires all three.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DkgConfig {
    #[serde(default)]
    pub otnode_url: Option<String>,
    #[serde(default)]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub publish_wallet: Option<String>,
}

/// The settings a publish attempt needs, borrowed from a validated config.
/// The wallet key is checked for presence but never carried further.
#[derive(Debug, Clone, Copy)]
pub struct PublishSettings<'a> {
    pub endpoint: &'a str,
    pub blockchain: &'a str,
}

impl DkgConfig {
    /// Read all settings from the process environment. Empty values count
    /// as unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Overlay environment values onto settings loaded from a file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_value(ENV_OTNODE_URL) {
            self.otnode_url = Some(value);
        }
        if let Some(value) = env_value(ENV_BLOCKCHAIN) {
            self.blockchain = Some(value);
        }
        if let Some(value) = env_value(ENV_PUBLISH_WALLET) {
            self.publish_wallet = Some(value);
        }
    }

    /// The configured endpoint for display in operator messages.
    pub fn endpoint_display(&self) -> &str {
        self.otnode_url.as_deref().unwrap_or("NOT SET")
    }

    /// Check that the configured endpoint is a non-local network address.
    ///
    /// Rejects an absent endpoint, any URL containing `localhost` or
    /// `127.0.0.1`, and any URL whose parsed hostname is a loopback name.
    /// A string that does not parse as a URL passes the hostname check; the
    /// substring check has already run at that point.
    pub fn validate_remote_endpoint(&self) -> Result<&str, DkgError> {
        let endpoint = self
            .otnode_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DkgError::Configuration(format!(
                    "{ENV_OTNODE_URL} is not configured. Set {ENV_OTNODE_URL} to a remote \
                     OT-node (e.g. {EXAMPLE_REMOTE_NODE}). Community notes are queried from \
                     the remote DKG network, not a local node."
                ))
            })?;

        let lower = endpoint.to_ascii_lowercase();
        if lower.contains("localhost") || lower.contains("127.0.0.1") {
            return Err(DkgError::Configuration(format!(
                "{ENV_OTNODE_URL} is configured to use a local node ({endpoint}). Community \
                 notes must be queried from a remote OT-node connected to the DKG network, \
                 for example: {EXAMPLE_REMOTE_NODE}"
            )));
        }

        if let Ok(url) = Url::parse(endpoint) {
            if let Some(host) = url.host_str() {
                if is_loopback_host(host) {
                    return Err(DkgError::Configuration(format!(
                        "{ENV_OTNODE_URL} points to a local address ({host}). Community notes \
                         must be queried from a remote OT-node, for example: \
                         {EXAMPLE_REMOTE_NODE}"
                    )));
                }
            }
        }

        Ok(endpoint)
    }

    /// Check the three settings a publish attempt depends on, each with its
    /// own operator-facing message.
    pub fn require_publish_settings(&self) -> Result<PublishSettings<'_>, DkgError> {
        let endpoint = self
            .otnode_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DkgError::Configuration(format!(
                    "DKG endpoint not configured. Set the {ENV_OTNODE_URL} environment \
                     variable. Example: {EXAMPLE_REMOTE_NODE}"
                ))
            })?;

        let blockchain = self
            .blockchain
            .as_deref()
            .filter(|chain| !chain.is_empty())
            .ok_or_else(|| {
                DkgError::Configuration(format!(
                    "DKG blockchain not configured. Set the {ENV_BLOCKCHAIN} environment \
                     variable. Example: otp:20430 (testnet) or otp:2043 (mainnet)"
                ))
            })?;

        if self
            .publish_wallet
            .as_deref()
            .filter(|wallet| !wallet.is_empty())
            .is_none()
        {
            return Err(DkgError::Configuration(format!(
                "DKG wallet private key not configured. Set the {ENV_PUBLISH_WALLET} \
                 environment variable with the publishing wallet's private key."
            )));
        }

        Ok(PublishSettings {
            endpoint,
            blockchain,
        })
    }

    /// Whether the configured endpoint targets a loopback address. Drives
    /// the advisory connectivity probe on the publish path.
    pub fn is_loopback_endpoint(&self) -> bool {
        let Some(endpoint) = self.otnode_url.as_deref() else {
            return false;
        };
        let lower = endpoint.to_ascii_lowercase();
        if lower.contains("localhost") || lower.contains("127.0.0.1") {
            return true;
        }
        Url::parse(endpoint)
            .ok()
            .and_then(|url| url.host_str().map(is_loopback_host))
            .unwrap_or(false)
    }
}

fn is_loopback_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "::1"
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_endpoint(url: &str) -> DkgConfig {
        DkgConfig {
            otnode_url: Some(url.to_string()),
            ..DkgConfig::default()
        }
    }

    #[test]
    fn rejects_absent_endpoint() {
        let err = DkgConfig::default().validate_remote_endpoint().unwrap_err();
        assert!(err.to_string().contains(ENV_OTNODE_URL));
    }

    #[test]
    fn rejects_localhost_in_any_position() {
        for url in [
            "http://localhost:8900",
            "https://LOCALHOST:8900",
            "http://127.0.0.1:8900",
            "something-with-localhost-inside",
        ] {
            assert!(
                with_endpoint(url).validate_remote_endpoint().is_err(),
                "expected {url} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_ipv6_loopback_hostname() {
        assert!(with_endpoint("http://[::1]:8900")
            .validate_remote_endpoint()
            .is_err());
    }

    #[test]
    fn accepts_remote_endpoint() {
        let config = with_endpoint(EXAMPLE_REMOTE_NODE);
        assert_eq!(
            config.validate_remote_endpoint().unwrap(),
            EXAMPLE_REMOTE_NODE
        );
    }

    #[test]
    fn unparseable_non_local_string_passes() {
        assert!(with_endpoint("not a url at all")
            .validate_remote_endpoint()
            .is_ok());
    }

    #[test]
    fn publish_settings_require_all_three_values() {
        let mut config = DkgConfig::default();
        assert!(config.require_publish_settings().is_err());

        config.otnode_url = Some(EXAMPLE_REMOTE_NODE.to_string());
        let err = config.require_publish_settings().unwrap_err();
        assert!(err.to_string().contains(ENV_BLOCKCHAIN));

        config.blockchain = Some("otp:20430".to_string());
        let err = config.require_publish_settings().unwrap_err();
        assert!(err.to_string().contains(ENV_PUBLISH_WALLET));

        config.publish_wallet = Some("0xkey".to_string());
        let settings = config.require_publish_settings().unwrap();
        assert_eq!(settings.endpoint, EXAMPLE_REMOTE_NODE);
        assert_eq!(settings.blockchain, "otp:20430");
    }

    #[test]
    fn loopback_detection_covers_names_and_addresses() {
        assert!(with_endpoint("http://localhost:8900").is_loopback_endpoint());
        assert!(with_endpoint("http://127.0.0.1:8900").is_loopback_endpoint());
        assert!(with_endpoint("http://[::1]:8900").is_loopback_endpoint());
        assert!(!with_endpoint(EXAMPLE_REMOTE_NODE).is_loopback_endpoint());
        assert!(!DkgConfig::default().is_loopback_endpoint());
    }
}
