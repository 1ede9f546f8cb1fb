//! Pin policy configuration
//!
//! Policies are YAML documents:
//!
//! ```yaml
//! algorithm: SHA256
//! all_hosts_must_be_evaluated: true
//! hosts:
//!   api.example.com:
//!     pins:
//!       - "E3B0 C442 98FC 1C14 ..."
//!   legacy.example.com:
//!     algorithm: SHA1
//!     pins:
//!       - "da39a3ee5e6b4b0d3255bfef95601890afd80709"
//! ```

use crate::trust::algorithm::DigestAlgorithm;
use crate::trust::error::ConfigError;
use crate::trust::pins::{normalize_pin, PinnedFingerprintSet};
use crate::trust::policy::{normalize_host, PinPolicy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Top-level pin policy file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinningConfig {
    /// Default algorithm for hosts that don't set their own
    #[serde(default)]
    pub algorithm: DigestAlgorithm,

    /// Refuse hosts that have no pins instead of skipping pinning for them
    #[serde(default = "default_all_hosts_must_be_evaluated")]
    pub all_hosts_must_be_evaluated: bool,

    /// Pins keyed by host name
    #[serde(default)]
    pub hosts: BTreeMap<String, HostPins>,
}

fn default_all_hosts_must_be_evaluated() -> bool {
    true
}

impl Default for PinningConfig {
    fn default() -> Self {
        PinningConfig {
            algorithm: DigestAlgorithm::default(),
            all_hosts_must_be_evaluated: default_all_hosts_must_be_evaluated(),
            hosts: BTreeMap::new(),
        }
    }
}

/// Pins for one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostPins {
    /// Overrides the file-level algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<DigestAlgorithm>,

    /// Hex fingerprints, any case, whitespace allowed
    pub pins: Vec<String>,
}

/// A pin that can never match because of its length or characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinWarning {
    pub host: String,
    pub pin: String,
    pub algorithm: DigestAlgorithm,
}

impl std::fmt::Display for PinWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: '{}' is not a {}-character {} fingerprint",
            self.host,
            self.pin,
            self.algorithm.hex_len(),
            self.algorithm
        )
    }
}

impl PinningConfig {
    /// Parse a policy from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(content).map_err(|source| ConfigError::ParseError { source })
    }

    /// Read and parse a policy file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading pin configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        debug!("Pin configuration loaded: {} hosts", config.hosts.len());
        Ok(config)
    }

    /// Effective algorithm for a host entry
    pub fn algorithm_for(&self, host: &HostPins) -> DigestAlgorithm {
        host.algorithm.unwrap_or(self.algorithm)
    }

    /// Check structural problems and report pins that can never match.
    ///
    /// Empty host names, hosts without pins and keys naming the same host
    /// are errors. Malformed pins are returned as warnings because they fail
    /// closed.
    pub fn validate(&self) -> Result<Vec<PinWarning>, ConfigError> {
        let mut warnings = Vec::new();
        let mut seen = BTreeSet::new();

        for (host, entry) in &self.hosts {
            let normalized = normalize_host(host);
            if normalized.is_empty() {
                return Err(ConfigError::EmptyHost);
            }
            if !seen.insert(normalized.clone()) {
                return Err(ConfigError::DuplicateHost { host: normalized });
            }
            if entry.pins.iter().all(|pin| normalize_pin(pin).is_empty()) {
                return Err(ConfigError::NoPins { host: host.clone() });
            }

            let algorithm = self.algorithm_for(entry);
            let set = PinnedFingerprintSet::new(&entry.pins, algorithm);
            for pin in set.malformed() {
                warnings.push(PinWarning {
                    host: host.clone(),
                    pin: pin.to_string(),
                    algorithm,
                });
            }
        }

        Ok(warnings)
    }

    /// Validate, then build the runtime host policy.
    ///
    /// Malformed pins are not an error here; use [`validate`](Self::validate)
    /// to list them.
    pub fn to_policy(&self) -> Result<PinPolicy, ConfigError> {
        self.validate()?;

        let mut policy = PinPolicy::new(self.all_hosts_must_be_evaluated);
        for (host, entry) in &self.hosts {
            policy.insert(
                host,
                PinnedFingerprintSet::new(&entry.pins, self.algorithm_for(entry)),
            );
        }
        Ok(policy)
    }
}
