//! Certificate file loading
//!
//! Files may hold a single DER certificate or any number of PEM
//! `CERTIFICATE` blocks. Only the encoding is unwrapped; certificate
//! contents are never parsed.

use anyhow::{bail, Context, Result};
use rustls::pki_types::CertificateDer;
use std::path::{Path, PathBuf};
use tracing::debug;

const PEM_MARKER: &[u8] = b"-----BEGIN";

fn is_pem(bytes: &[u8]) -> bool {
    bytes.trim_ascii_start().starts_with(PEM_MARKER)
}

/// Load every certificate stored in a file, in file order
pub fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read certificate file: {}", path.display()))?;

    if !is_pem(&bytes) {
        debug!("{}: treating as DER ({} bytes)", path.display(), bytes.len());
        if bytes.is_empty() {
            bail!("Certificate file is empty: {}", path.display());
        }
        return Ok(vec![CertificateDer::from(bytes)]);
    }

    let certs = rustls_pemfile::certs(&mut bytes.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to decode PEM certificates in {}", path.display()))?;

    if certs.is_empty() {
        bail!("No CERTIFICATE blocks found in {}", path.display());
    }
    debug!("{}: {} PEM certificates", path.display(), certs.len());

    Ok(certs)
}

/// Concatenate the certificates of several files into one chain (leaf first)
pub fn load_chain(paths: &[PathBuf]) -> Result<Vec<CertificateDer<'static>>> {
    let mut chain = Vec::new();
    for path in paths {
        chain.extend(load_certificates(path)?);
    }
    Ok(chain)
}
