//! certpin Trust System - certificate pinning by fingerprint comparison
//!
//! This module adds a pinning check on top of standard TLS validation: a
//! presented chain is trusted only if one of its certificates hashes to a
//! configured fingerprint.
//!
//! Design Principles:
//! - Fail closed - empty chains, malformed pins and upstream failures never accept
//! - Closed algorithm choice - SHA-1 or SHA-256, unknown selectors are errors
//! - Pure evaluation - no mutable state, safe to share across threads
//! - Industry standard crypto - RustCrypto SHA-1 and SHA-256

pub mod algorithm;
pub mod error;
pub mod evaluator;
pub mod hasher;
pub mod pins;
pub mod policy;
pub mod upstream;

pub use algorithm::DigestAlgorithm;
pub use error::{ConfigError, PolicyError, RejectReason, TrustError};
pub use evaluator::{evaluate_chain, EvaluationOutcome, FingerprintTrustEvaluator};
pub use hasher::{compute_fingerprint, Fingerprint};
pub use pins::PinnedFingerprintSet;
pub use policy::PinPolicy;
pub use upstream::{AssumeTrusted, ChainTrust};
