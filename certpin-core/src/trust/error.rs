//! Trust system error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Why a certificate chain was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Underlying chain/hostname validation did not succeed
    #[error("upstream certificate chain validation failed")]
    UpstreamTrustFailed,

    /// The peer presented zero certificates
    #[error("no certificates were presented")]
    EmptyChain,

    /// The chain validated but no certificate matched a pinned fingerprint
    #[error("no certificate in the chain matches a pinned fingerprint")]
    NoMatchingFingerprint,
}

impl RejectReason {
    /// Stable machine-readable code for logs and diagnostics
    pub const fn code(self) -> &'static str {
        match self {
            RejectReason::UpstreamTrustFailed => "upstream_trust_failed",
            RejectReason::EmptyChain => "empty_chain",
            RejectReason::NoMatchingFingerprint => "no_matching_fingerprint",
        }
    }
}

/// A rejected evaluation surfaced as an error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// Server trust evaluation failed for the given host
    #[error("Server trust evaluation failed for {host}: {reason}")]
    Rejected { host: String, reason: RejectReason },
}

impl TrustError {
    /// The rejection reason carried by this error
    pub fn reason(&self) -> RejectReason {
        match self {
            TrustError::Rejected { reason, .. } => *reason,
        }
    }

    /// Log security-critical trust errors
    pub fn log_if_security_critical(&self) {
        match self {
            TrustError::Rejected {
                host,
                reason: RejectReason::NoMatchingFingerprint,
            } => {
                tracing::error!(target: "security", host = %host, "PIN VIOLATION: {}", self);
            }
            _ => {}
        }
    }
}

/// Errors from pin configuration loading and parsing
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Algorithm selector is not one of the recognized values
    #[error("Unknown digest algorithm '{value}' (expected SHA1 or SHA256)")]
    UnknownAlgorithm { value: String },

    /// Failed to read the pin configuration
    #[error("Failed to read pin configuration from {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the pin configuration
    #[error("Failed to parse pin configuration (invalid YAML or schema)")]
    ParseError {
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A host entry has an empty name
    #[error("Pin configuration contains a host entry with an empty name")]
    EmptyHost,

    /// A host entry lists no pins at all
    #[error("Host '{host}' has no pinned fingerprints.\n\nAdd at least one fingerprint, or remove the host entry.")]
    NoPins { host: String },

    /// Two host keys name the same host once normalized
    #[error("Host '{host}' is listed more than once (host names are case-insensitive and ignore a trailing dot)")]
    DuplicateHost { host: String },
}

/// Errors from host policy lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Every host must be pinned, and this one is not
    #[error("No pinned fingerprints are configured for host '{host}'")]
    HostNotConfigured { host: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(RejectReason::UpstreamTrustFailed.code(), "upstream_trust_failed");
        assert_eq!(RejectReason::EmptyChain.code(), "empty_chain");
        assert_eq!(
            RejectReason::NoMatchingFingerprint.code(),
            "no_matching_fingerprint"
        );
    }

    #[test]
    fn test_rejected_message_names_host_and_reason() {
        let err = TrustError::Rejected {
            host: "api.example.com".to_string(),
            reason: RejectReason::EmptyChain,
        };
        let message = err.to_string();
        assert!(message.contains("api.example.com"));
        assert!(message.contains("no certificates were presented"));
        assert_eq!(err.reason(), RejectReason::EmptyChain);
    }
}
