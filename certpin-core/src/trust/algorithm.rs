//! Digest algorithm selection for certificate fingerprints

use crate::trust::error::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Hash function applied to each certificate's raw DER bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    /// SHA-1, 20 byte digest
    Sha1,
    /// SHA-256, 32 byte digest (default)
    #[default]
    Sha256,
}

impl DigestAlgorithm {
    /// Length of the binary digest in bytes
    pub const fn digest_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
        }
    }

    /// Length of the lowercase hex encoding
    pub const fn hex_len(self) -> usize {
        self.digest_len() * 2
    }

    /// Canonical selector string
    pub const fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown selectors are an error, never a silent fallback to SHA-256.
impl FromStr for DigestAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHA1" | "SHA-1" => Ok(DigestAlgorithm::Sha1),
            "SHA256" | "SHA-256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(ConfigError::UnknownAlgorithm {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for DigestAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DigestAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
