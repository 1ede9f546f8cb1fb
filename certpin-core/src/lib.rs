//! certpin library exports

pub mod config;
pub mod trust;

#[cfg(feature = "rustls")]
pub mod tls;

pub use config::PinningConfig;
pub use trust::{
    ChainTrust, DigestAlgorithm, EvaluationOutcome, FingerprintTrustEvaluator,
    PinnedFingerprintSet, RejectReason,
};
