//! Test helper functions for integration tests

use certpin_core::trust::{compute_fingerprint, DigestAlgorithm};
use std::sync::Once;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Stand-in DER bytes for a leaf certificate
pub const LEAF: &[u8] = b"\x30\x82\x01\x0a leaf certificate for api.example.com";

/// Stand-in DER bytes for an intermediate CA certificate
pub const INTERMEDIATE: &[u8] = b"\x30\x82\x02\x0b intermediate CA certificate";

/// Stand-in DER bytes for a root CA certificate
pub const ROOT: &[u8] = b"\x30\x82\x03\x0c root CA certificate";

/// Hex fingerprint of `der` under `algorithm`
pub fn hex_of(der: &[u8], algorithm: DigestAlgorithm) -> String {
    compute_fingerprint(der, algorithm).as_hex().to_string()
}

/// Render a hex pin the way people paste them: uppercase, spaced in pairs
pub fn spaced_upper(hex: &str) -> String {
    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}
