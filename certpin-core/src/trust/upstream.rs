//! The upstream trust seam
//!
//! Standard TLS validation (path building, expiry, revocation, hostname
//! matching) is not done here. Pinning runs after a `ChainTrust`
//! implementation has accepted the chain for the host.

/// Standard chain/hostname validation consulted before pinning
pub trait ChainTrust {
    /// Returns `true` when `chain` (leaf first) is trusted for `host`
    fn check_chain_trust(&self, chain: &[&[u8]], host: &str) -> bool;
}

impl<F> ChainTrust for F
where
    F: Fn(&[&[u8]], &str) -> bool,
{
    fn check_chain_trust(&self, chain: &[&[u8]], host: &str) -> bool {
        self(chain, host)
    }
}

/// Upstream that accepts every chain.
///
/// Only for callers that already validated the chain themselves, or for
/// offline pin checks against certificate files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeTrusted;

impl ChainTrust for AssumeTrusted {
    fn check_chain_trust(&self, _chain: &[&[u8]], _host: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_upstream() {
        let only_example = |_chain: &[&[u8]], host: &str| host == "example.com";
        assert!(only_example.check_chain_trust(&[], "example.com"));
        assert!(!only_example.check_chain_trust(&[], "evil.test"));
    }

    #[test]
    fn test_assume_trusted_behind_trait_object() {
        let boxed: Box<dyn ChainTrust> = Box::new(AssumeTrusted);
        assert!(boxed.check_chain_trust(&[b"cert".as_slice()], "host"));
        assert!(boxed.check_chain_trust(&[], ""));
    }
}
