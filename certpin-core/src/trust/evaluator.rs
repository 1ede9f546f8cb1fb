//! Fingerprint trust evaluation - the pinning decision for a presented chain
//!
//! The evaluator runs after standard TLS validation and adds one check: at
//! least one certificate in the chain must hash to a pinned fingerprint.

use crate::trust::algorithm::DigestAlgorithm;
use crate::trust::error::{RejectReason, TrustError};
use crate::trust::hasher::{compute_fingerprint, Fingerprint};
use crate::trust::pins::PinnedFingerprintSet;
use crate::trust::upstream::ChainTrust;
use tracing::{debug, info, trace, warn};

/// Result of evaluating one certificate chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationOutcome {
    /// A certificate in the chain matched a pinned fingerprint
    Accept,
    /// The chain must not be trusted
    Reject(RejectReason),
}

impl EvaluationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, EvaluationOutcome::Accept)
    }

    /// Rejection reason, if any
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            EvaluationOutcome::Accept => None,
            EvaluationOutcome::Reject(reason) => Some(*reason),
        }
    }

    /// Convert into a `Result` so callers can propagate rejections with `?`
    pub fn into_result(self, host: &str) -> Result<(), TrustError> {
        match self {
            EvaluationOutcome::Accept => Ok(()),
            EvaluationOutcome::Reject(reason) => Err(TrustError::Rejected {
                host: host.to_string(),
                reason,
            }),
        }
    }
}

/// Run the pinning decision for `chain` against `pins`.
///
/// The upstream check is consulted exactly once. An empty chain is rejected
/// even when the upstream accepted it. Certificates are hashed in order and
/// the first pinned one accepts the chain.
pub fn evaluate_chain<U, C>(
    pins: &PinnedFingerprintSet,
    upstream: &U,
    host: &str,
    chain: &[C],
) -> EvaluationOutcome
where
    U: ChainTrust + ?Sized,
    C: AsRef<[u8]>,
{
    let algorithm = pins.algorithm();
    decide(pins, upstream, host, chain, |der| {
        compute_fingerprint(der, algorithm)
    })
}

fn decide<U, C, F>(
    pins: &PinnedFingerprintSet,
    upstream: &U,
    host: &str,
    chain: &[C],
    mut fingerprint: F,
) -> EvaluationOutcome
where
    U: ChainTrust + ?Sized,
    C: AsRef<[u8]>,
    F: FnMut(&[u8]) -> Fingerprint,
{
    let certificates: Vec<&[u8]> = chain.iter().map(AsRef::as_ref).collect();

    debug!(
        "Evaluating server trust for {}: {} certificates, {} {} pins",
        host,
        certificates.len(),
        pins.len(),
        pins.algorithm()
    );

    if !upstream.check_chain_trust(&certificates, host) {
        warn!("Upstream chain validation failed for {}", host);
        return EvaluationOutcome::Reject(RejectReason::UpstreamTrustFailed);
    }

    if certificates.is_empty() {
        warn!("No certificates presented by {}", host);
        return EvaluationOutcome::Reject(RejectReason::EmptyChain);
    }

    for (index, der) in certificates.iter().copied().enumerate() {
        let computed = fingerprint(der);
        trace!("Certificate {} for {}: {}", index, host, computed);

        if pins.matches(&computed) {
            info!(
                "Pinned fingerprint matched for {} at chain position {}",
                host, index
            );
            return EvaluationOutcome::Accept;
        }
    }

    warn!(
        "No certificate presented by {} matches a pinned {} fingerprint",
        host,
        pins.algorithm()
    );
    EvaluationOutcome::Reject(RejectReason::NoMatchingFingerprint)
}

/// Certificate pinning evaluator - holds the pins and the upstream check
///
/// Stateless across calls: the pin set and algorithm are fixed at
/// construction, so one instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct FingerprintTrustEvaluator<U> {
    pins: PinnedFingerprintSet,
    upstream: U,
}

impl<U: ChainTrust> FingerprintTrustEvaluator<U> {
    /// Create an evaluator from configured pin strings
    pub fn new<I, S>(pinned_fingerprints: I, algorithm: DigestAlgorithm, upstream: U) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_pins(
            PinnedFingerprintSet::new(pinned_fingerprints, algorithm),
            upstream,
        )
    }

    /// Create an evaluator from an already normalized pin set
    pub fn with_pins(pins: PinnedFingerprintSet, upstream: U) -> Self {
        FingerprintTrustEvaluator { pins, upstream }
    }

    pub fn pins(&self) -> &PinnedFingerprintSet {
        &self.pins
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.pins.algorithm()
    }

    /// Decide whether `chain` (leaf first) should be trusted for `host`
    pub fn evaluate<C: AsRef<[u8]>>(&self, host: &str, chain: &[C]) -> EvaluationOutcome {
        evaluate_chain(&self.pins, &self.upstream, host, chain)
    }

    /// Like [`evaluate`](Self::evaluate), but rejections become a [`TrustError`]
    pub fn verify<C: AsRef<[u8]>>(&self, host: &str, chain: &[C]) -> Result<(), TrustError> {
        self.evaluate(host, chain).into_result(host).inspect_err(|e| {
            e.log_if_security_critical();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::upstream::AssumeTrusted;
    use std::cell::Cell;

    const LEAF: &[u8] = b"leaf certificate DER";
    const INTERMEDIATE: &[u8] = b"intermediate certificate DER";
    const ROOT: &[u8] = b"root certificate DER";

    fn sha256_hex(der: &[u8]) -> String {
        compute_fingerprint(der, DigestAlgorithm::Sha256)
            .as_hex()
            .to_string()
    }

    fn reject_all(_chain: &[&[u8]], _host: &str) -> bool {
        false
    }

    #[test]
    fn test_accepts_pinned_leaf() {
        let evaluator =
            FingerprintTrustEvaluator::new([sha256_hex(LEAF)], DigestAlgorithm::Sha256, AssumeTrusted);
        assert_eq!(
            evaluator.evaluate("example.com", &[LEAF, INTERMEDIATE, ROOT]),
            EvaluationOutcome::Accept
        );
    }

    #[test]
    fn test_accepts_pinned_certificate_at_any_position() {
        let evaluator =
            FingerprintTrustEvaluator::new([sha256_hex(ROOT)], DigestAlgorithm::Sha256, AssumeTrusted);
        assert!(evaluator
            .evaluate("example.com", &[LEAF, INTERMEDIATE, ROOT])
            .is_accepted());
        assert!(evaluator
            .evaluate("example.com", &[ROOT, LEAF])
            .is_accepted());
    }

    #[test]
    fn test_rejects_unpinned_chain() {
        let evaluator = FingerprintTrustEvaluator::new(
            [sha256_hex(b"some other certificate")],
            DigestAlgorithm::Sha256,
            AssumeTrusted,
        );
        assert_eq!(
            evaluator.evaluate("example.com", &[LEAF, INTERMEDIATE]),
            EvaluationOutcome::Reject(RejectReason::NoMatchingFingerprint)
        );
    }

    #[test]
    fn test_rejects_empty_chain_even_if_upstream_passes() {
        let evaluator =
            FingerprintTrustEvaluator::new([sha256_hex(LEAF)], DigestAlgorithm::Sha256, AssumeTrusted);
        let empty: [&[u8]; 0] = [];
        assert_eq!(
            evaluator.evaluate("example.com", &empty),
            EvaluationOutcome::Reject(RejectReason::EmptyChain)
        );
    }

    #[test]
    fn test_upstream_failure_wins_over_pins() {
        let evaluator =
            FingerprintTrustEvaluator::new([sha256_hex(LEAF)], DigestAlgorithm::Sha256, reject_all);
        assert_eq!(
            evaluator.evaluate("example.com", &[LEAF]),
            EvaluationOutcome::Reject(RejectReason::UpstreamTrustFailed)
        );
    }

    #[test]
    fn test_upstream_called_once_with_host_and_chain() {
        let calls = Cell::new(0);
        let upstream = |chain: &[&[u8]], host: &str| {
            calls.set(calls.get() + 1);
            assert_eq!(host, "api.example.com");
            assert_eq!(chain, &[LEAF, ROOT]);
            true
        };
        let evaluator =
            FingerprintTrustEvaluator::new([sha256_hex(ROOT)], DigestAlgorithm::Sha256, upstream);

        assert!(evaluator.evaluate("api.example.com", &[LEAF, ROOT]).is_accepted());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_short_circuits_on_first_match() {
        let pins = PinnedFingerprintSet::new([sha256_hex(LEAF)], DigestAlgorithm::Sha256);
        let mut hashed = 0;
        let outcome = decide(
            &pins,
            &AssumeTrusted,
            "example.com",
            &[LEAF, INTERMEDIATE, ROOT],
            |der| {
                hashed += 1;
                compute_fingerprint(der, DigestAlgorithm::Sha256)
            },
        );
        assert_eq!(outcome, EvaluationOutcome::Accept);
        assert_eq!(hashed, 1);
    }

    #[test]
    fn test_hashes_whole_chain_when_nothing_matches() {
        let pins = PinnedFingerprintSet::new(["deadbeef"], DigestAlgorithm::Sha256);
        let mut hashed = 0;
        let outcome = decide(
            &pins,
            &AssumeTrusted,
            "example.com",
            &[LEAF, INTERMEDIATE, ROOT],
            |der| {
                hashed += 1;
                compute_fingerprint(der, DigestAlgorithm::Sha256)
            },
        );
        assert_eq!(
            outcome,
            EvaluationOutcome::Reject(RejectReason::NoMatchingFingerprint)
        );
        assert_eq!(hashed, 3);
    }

    #[test]
    fn test_verify_maps_rejection_to_error() {
        let evaluator =
            FingerprintTrustEvaluator::new(["deadbeef"], DigestAlgorithm::Sha256, AssumeTrusted);
        let err = evaluator.verify("example.com", &[LEAF]).unwrap_err();
        assert_eq!(
            err,
            TrustError::Rejected {
                host: "example.com".to_string(),
                reason: RejectReason::NoMatchingFingerprint,
            }
        );

        let evaluator =
            FingerprintTrustEvaluator::new([sha256_hex(LEAF)], DigestAlgorithm::Sha256, AssumeTrusted);
        assert!(evaluator.verify("example.com", &[LEAF]).is_ok());
    }

    #[test]
    fn test_outcome_accessors() {
        assert_eq!(EvaluationOutcome::Accept.reason(), None);
        assert_eq!(
            EvaluationOutcome::Reject(RejectReason::EmptyChain).reason(),
            Some(RejectReason::EmptyChain)
        );
        assert!(!EvaluationOutcome::Reject(RejectReason::EmptyChain).is_accepted());
    }
}
