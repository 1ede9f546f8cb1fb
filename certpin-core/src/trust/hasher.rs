//! Cryptographic hashing utilities for the trust system
//!
//! Uses SHA-1 or SHA-256 over a certificate's raw DER bytes and encodes the
//! digest as lowercase hex without separators.

use crate::trust::algorithm::DigestAlgorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;

/// A certificate digest together with its hex encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    algorithm: DigestAlgorithm,
    digest: Vec<u8>,
    hex: String,
}

impl Fingerprint {
    /// Algorithm that produced this fingerprint
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Binary digest (20 bytes for SHA-1, 32 for SHA-256)
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Lowercase hex, two characters per byte
    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// Uppercase, colon separated rendering (`AB:CD:...`) as printed by openssl
    pub fn colon_separated(&self) -> String {
        self.digest
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Hash raw certificate bytes with the given algorithm
pub fn compute_fingerprint(data: &[u8], algorithm: DigestAlgorithm) -> Fingerprint {
    let digest = match algorithm {
        DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
    };
    let hex = hex::encode(&digest);

    Fingerprint {
        algorithm,
        digest,
        hex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const SHA1_EMPTY: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    #[test]
    fn test_sha256_known_vectors() {
        let fp = compute_fingerprint(b"", DigestAlgorithm::Sha256);
        assert_eq!(fp.as_hex(), SHA256_EMPTY);
        assert_eq!(fp.digest().len(), 32);

        let fp = compute_fingerprint(b"abc", DigestAlgorithm::Sha256);
        assert_eq!(
            fp.as_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha1_known_vectors() {
        let fp = compute_fingerprint(b"", DigestAlgorithm::Sha1);
        assert_eq!(fp.as_hex(), SHA1_EMPTY);
        assert_eq!(fp.digest().len(), 20);

        let fp = compute_fingerprint(b"abc", DigestAlgorithm::Sha1);
        assert_eq!(fp.as_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_hex_is_lowercase_without_separators() {
        let fp = compute_fingerprint(b"certificate bytes", DigestAlgorithm::Sha256);
        assert_eq!(fp.as_hex().len(), 64);
        assert!(fp
            .as_hex()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(fp.to_string(), fp.as_hex());
    }

    #[test]
    fn test_colon_separated() {
        let fp = compute_fingerprint(b"abc", DigestAlgorithm::Sha1);
        assert!(fp.colon_separated().starts_with("A9:99:3E:36"));
        assert_eq!(fp.colon_separated().len(), 20 * 3 - 1);
    }

    #[test]
    fn test_deterministic() {
        let a = compute_fingerprint(b"same input", DigestAlgorithm::Sha256);
        let b = compute_fingerprint(b"same input", DigestAlgorithm::Sha256);
        assert_eq!(a, b);
    }
}
