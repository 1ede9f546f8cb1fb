//! Per-host pin policy
//!
//! Keeps one pin set per host name. Host names are compared
//! case-insensitively and a trailing dot is ignored.

use crate::trust::error::PolicyError;
use crate::trust::evaluator::{evaluate_chain, EvaluationOutcome};
use crate::trust::pins::PinnedFingerprintSet;
use crate::trust::upstream::ChainTrust;
use std::collections::BTreeMap;
use tracing::debug;

/// Canonical form of a host name used as a policy key
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Pin sets keyed by host
#[derive(Debug, Clone, Default)]
pub struct PinPolicy {
    hosts: BTreeMap<String, PinnedFingerprintSet>,
    all_hosts_must_be_evaluated: bool,
}

impl PinPolicy {
    /// Empty policy. With `all_hosts_must_be_evaluated`, hosts without pins
    /// are refused instead of passed through.
    pub fn new(all_hosts_must_be_evaluated: bool) -> Self {
        PinPolicy {
            hosts: BTreeMap::new(),
            all_hosts_must_be_evaluated,
        }
    }

    /// Add or replace the pins for a host
    pub fn insert(&mut self, host: &str, pins: PinnedFingerprintSet) {
        self.hosts.insert(normalize_host(host), pins);
    }

    pub fn all_hosts_must_be_evaluated(&self) -> bool {
        self.all_hosts_must_be_evaluated
    }

    /// Pins configured for a host, if any
    pub fn pins_for(&self, host: &str) -> Option<&PinnedFingerprintSet> {
        self.hosts.get(&normalize_host(host))
    }

    /// Configured host names in sorted order
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// Evaluate a chain for `host`.
    ///
    /// Returns `Ok(None)` when the host has no pins and unpinned hosts are
    /// allowed, so the caller falls back to standard validation alone.
    pub fn evaluate<U, C>(
        &self,
        host: &str,
        chain: &[C],
        upstream: &U,
    ) -> Result<Option<EvaluationOutcome>, PolicyError>
    where
        U: ChainTrust + ?Sized,
        C: AsRef<[u8]>,
    {
        match self.pins_for(host) {
            Some(pins) => Ok(Some(evaluate_chain(pins, upstream, host, chain))),
            None if self.all_hosts_must_be_evaluated => Err(PolicyError::HostNotConfigured {
                host: host.to_string(),
            }),
            None => {
                debug!("No pins configured for {} - pinning skipped", host);
                Ok(None)
            }
        }
    }
}
