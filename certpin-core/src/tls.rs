//! rustls integration
//!
//! [`PinnedServerCertVerifier`] plugs the pinning decision into a rustls
//! client: the wrapped verifier performs standard validation as the upstream
//! check, then the presented chain must contain a pinned certificate.

use crate::trust::error::{RejectReason, TrustError};
use crate::trust::evaluator::{evaluate_chain, EvaluationOutcome};
use crate::trust::pins::PinnedFingerprintSet;
use crate::trust::upstream::ChainTrust;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{VerifierBuilderError, WebPkiServerVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, warn};

fn webpki_verifier(
    roots: Arc<RootCertStore>,
) -> Result<Arc<dyn ServerCertVerifier>, VerifierBuilderError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = WebPkiServerVerifier::builder_with_provider(roots, provider).build()?;
    Ok(verifier)
}

fn verify_with(
    inner: &dyn ServerCertVerifier,
    chain: &[&[u8]],
    server_name: &ServerName<'_>,
    ocsp_response: &[u8],
    now: UnixTime,
) -> Result<(), rustls::Error> {
    let Some((leaf, rest)) = chain.split_first() else {
        return Err(rustls::Error::NoCertificatesPresented);
    };
    let end_entity = CertificateDer::from(*leaf);
    let intermediates: Vec<CertificateDer<'_>> =
        rest.iter().map(|der| CertificateDer::from(*der)).collect();

    inner
        .verify_server_cert(&end_entity, &intermediates, server_name, ocsp_response, now)
        .map(|_| ())
}

/// Upstream check backed by a rustls verifier (webpki by default).
///
/// Used outside a live handshake, so no OCSP response is available and the
/// current time is used for validity checks.
#[derive(Debug, Clone)]
pub struct WebPkiChainTrust {
    inner: Arc<dyn ServerCertVerifier>,
}

impl WebPkiChainTrust {
    /// Validate against the given trust anchors
    pub fn new(roots: Arc<RootCertStore>) -> Result<Self, VerifierBuilderError> {
        Ok(WebPkiChainTrust {
            inner: webpki_verifier(roots)?,
        })
    }

    /// Validate with an existing rustls verifier
    pub fn with_verifier(inner: Arc<dyn ServerCertVerifier>) -> Self {
        WebPkiChainTrust { inner }
    }
}

impl ChainTrust for WebPkiChainTrust {
    fn check_chain_trust(&self, chain: &[&[u8]], host: &str) -> bool {
        let server_name = match ServerName::try_from(host) {
            Ok(name) => name,
            Err(e) => {
                warn!("Invalid server name '{}': {}", host, e);
                return false;
            }
        };

        match verify_with(self.inner.as_ref(), chain, &server_name, &[], UnixTime::now()) {
            Ok(()) => true,
            Err(e) => {
                debug!("Chain validation failed for {}: {}", host, e);
                false
            }
        }
    }
}

/// Upstream check for one handshake. Keeps the inner verifier's error so it
/// can be returned to rustls unchanged.
struct HandshakeTrust<'a> {
    inner: &'a dyn ServerCertVerifier,
    server_name: &'a ServerName<'a>,
    ocsp_response: &'a [u8],
    now: UnixTime,
    failure: Cell<Option<rustls::Error>>,
}

impl ChainTrust for HandshakeTrust<'_> {
    fn check_chain_trust(&self, chain: &[&[u8]], _host: &str) -> bool {
        match verify_with(
            self.inner,
            chain,
            self.server_name,
            self.ocsp_response,
            self.now,
        ) {
            Ok(()) => true,
            Err(e) => {
                self.failure.set(Some(e));
                false
            }
        }
    }
}

/// rustls verifier that requires a pinned certificate in the server's chain
#[derive(Debug)]
pub struct PinnedServerCertVerifier {
    pins: PinnedFingerprintSet,
    inner: Arc<dyn ServerCertVerifier>,
}

impl PinnedServerCertVerifier {
    /// Pin on top of an existing verifier
    pub fn new(pins: PinnedFingerprintSet, inner: Arc<dyn ServerCertVerifier>) -> Self {
        PinnedServerCertVerifier { pins, inner }
    }

    /// Pin on top of webpki validation against `roots`
    pub fn with_roots(
        pins: PinnedFingerprintSet,
        roots: Arc<RootCertStore>,
    ) -> Result<Self, VerifierBuilderError> {
        Ok(Self::new(pins, webpki_verifier(roots)?))
    }

    pub fn pins(&self) -> &PinnedFingerprintSet {
        &self.pins
    }
}

impl ServerCertVerifier for PinnedServerCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let host = server_name.to_str();
        let chain: Vec<&[u8]> = std::iter::once(&**end_entity)
            .chain(intermediates.iter().map(|der| &**der))
            .collect();

        let upstream = HandshakeTrust {
            inner: self.inner.as_ref(),
            server_name,
            ocsp_response,
            now,
            failure: Cell::new(None),
        };

        match evaluate_chain(&self.pins, &upstream, &host, &chain) {
            EvaluationOutcome::Accept => Ok(ServerCertVerified::assertion()),
            EvaluationOutcome::Reject(RejectReason::UpstreamTrustFailed) => {
                Err(upstream.failure.take().unwrap_or(rustls::Error::InvalidCertificate(
                    CertificateError::ApplicationVerificationFailure,
                )))
            }
            EvaluationOutcome::Reject(reason) => {
                TrustError::Rejected {
                    host: host.to_string(),
                    reason,
                }
                .log_if_security_critical();
                Err(rustls::Error::InvalidCertificate(
                    CertificateError::ApplicationVerificationFailure,
                ))
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
