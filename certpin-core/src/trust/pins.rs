//! Pinned fingerprint set with construction-time normalization
//!
//! Pins are normalized once (whitespace stripped, lowercased) so evaluation
//! never case-folds configured values again. Malformed pins are kept: they
//! can never equal a computed digest, so they fail closed.

use crate::trust::algorithm::DigestAlgorithm;
use crate::trust::hasher::Fingerprint;
use tracing::{debug, warn};

/// Normalize a configured pin: drop all whitespace and lowercase it
pub fn normalize_pin(pin: &str) -> String {
    pin.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Immutable set of canonical hex fingerprints for one digest algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedFingerprintSet {
    algorithm: DigestAlgorithm,
    pins: Vec<String>,
}

impl PinnedFingerprintSet {
    /// Build a set from configured pin strings
    pub fn new<I, S>(pins: I, algorithm: DigestAlgorithm) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for pin in pins {
            let pin = normalize_pin(pin.as_ref());
            if !normalized.contains(&pin) {
                normalized.push(pin);
            }
        }

        let set = PinnedFingerprintSet {
            algorithm,
            pins: normalized,
        };

        for pin in set.malformed() {
            warn!(
                "Pinned fingerprint '{}' is not a {}-character {} hex digest and will never match",
                pin,
                algorithm.hex_len(),
                algorithm
            );
        }
        debug!("Pinned fingerprint set built: {} {} pins", set.len(), algorithm);

        set
    }

    /// Digest algorithm the pins are expressed in
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Normalized pins in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pins.iter().map(String::as_str)
    }

    /// Case-insensitive exact comparison of a hex digest against every pin
    pub fn contains_hex(&self, hex: &str) -> bool {
        self.pins.iter().any(|pin| pin.eq_ignore_ascii_case(hex))
    }

    /// Whether a computed fingerprint is pinned. Fingerprints from another
    /// algorithm never match.
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        fingerprint.algorithm() == self.algorithm && self.contains_hex(fingerprint.as_hex())
    }

    /// Pins with the wrong length or non-hex characters for this algorithm
    pub fn malformed(&self) -> Vec<&str> {
        let expected = self.algorithm.hex_len();
        self.pins
            .iter()
            .filter(|pin| pin.len() != expected || !pin.chars().all(|c| c.is_ascii_hexdigit()))
            .map(String::as_str)
            .collect()
    }
}
