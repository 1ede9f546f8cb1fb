//! Pinning CLI commands
//!
//! Provides the user interface for pinning: compute fingerprints, check a
//! chain against a policy, validate a policy file

use crate::certs::{load_certificates, load_chain};
use anyhow::{Context, Result};
use certpin_core::tls::WebPkiChainTrust;
use certpin_core::trust::{
    compute_fingerprint, AssumeTrusted, ChainTrust, DigestAlgorithm, PinPolicy,
    PinnedFingerprintSet,
};
use certpin_core::PinningConfig;
use clap::Parser;
use rustls::RootCertStore;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
pub enum PinCommand {
    /// Print the fingerprint of every certificate in DER or PEM files
    Fingerprint {
        /// Certificate files
        #[clap(required = true)]
        files: Vec<PathBuf>,

        /// Digest algorithm (SHA1 or SHA256)
        #[clap(long, default_value = "SHA256")]
        algorithm: DigestAlgorithm,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Evaluate a certificate chain against pinned fingerprints
    Check {
        /// Host the chain was presented for
        #[clap(long)]
        host: String,

        /// Pin policy file (YAML)
        #[clap(long, conflicts_with = "pins")]
        config: Option<PathBuf>,

        /// Pinned fingerprint (repeatable), used instead of a policy file
        #[clap(long = "pin", required_unless_present = "config")]
        pins: Vec<String>,

        /// Digest algorithm for --pin values
        #[clap(long, default_value = "SHA256", conflicts_with = "config")]
        algorithm: DigestAlgorithm,

        /// Skip standard chain validation and only compare fingerprints
        #[clap(long)]
        skip_upstream: bool,

        /// Chain files, leaf first
        #[clap(required = true)]
        files: Vec<PathBuf>,
    },

    /// Validate a pin policy file
    Validate {
        /// Pin policy file (YAML)
        #[clap(long)]
        config: PathBuf,
    },
}

impl PinCommand {
    /// Execute the pinning command
    pub fn execute(&self) -> Result<()> {
        match self {
            PinCommand::Fingerprint {
                files,
                algorithm,
                json,
            } => fingerprint_command(files, *algorithm, *json),
            PinCommand::Check {
                host,
                config,
                pins,
                algorithm,
                skip_upstream,
                files,
            } => check_command(
                host,
                config.as_deref(),
                pins,
                *algorithm,
                *skip_upstream,
                files,
            ),
            PinCommand::Validate { config } => validate_command(config),
        }
    }
}

#[derive(Tabled, Serialize)]
struct FingerprintRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Algorithm")]
    algorithm: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
}

fn fingerprint_command(files: &[PathBuf], algorithm: DigestAlgorithm, json: bool) -> Result<()> {
    let mut rows = Vec::new();
    for path in files {
        for (index, der) in load_certificates(path)?.iter().enumerate() {
            rows.push(FingerprintRow {
                file: path.display().to_string(),
                index,
                algorithm: algorithm.to_string(),
                fingerprint: compute_fingerprint(der, algorithm).as_hex().to_string(),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
    Ok(())
}

fn webpki_upstream() -> Result<WebPkiChainTrust> {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    WebPkiChainTrust::new(Arc::new(roots)).context("Failed to build webpki verifier")
}

fn load_policy(config: &Path) -> Result<PinPolicy> {
    let config = PinningConfig::load(config)?;
    for warning in config.validate()? {
        warn!("Pin will never match: {}", warning);
    }
    Ok(config.to_policy()?)
}

fn check_command(
    host: &str,
    config: Option<&Path>,
    pins: &[String],
    algorithm: DigestAlgorithm,
    skip_upstream: bool,
    files: &[PathBuf],
) -> Result<()> {
    let policy = match config {
        Some(path) => load_policy(path)?,
        None => {
            let mut policy = PinPolicy::new(true);
            policy.insert(host, PinnedFingerprintSet::new(pins, algorithm));
            policy
        }
    };

    let chain = load_chain(files)?;
    debug!("Loaded chain of {} certificates for {}", chain.len(), host);

    let upstream: Box<dyn ChainTrust> = if skip_upstream {
        info!("Standard chain validation skipped (--skip-upstream)");
        Box::new(AssumeTrusted)
    } else {
        Box::new(webpki_upstream()?)
    };

    match policy.evaluate(host, &chain, &*upstream)? {
        Some(outcome) => match outcome.into_result(host) {
            Ok(()) => {
                println!("✅ {host}: chain matches a pinned fingerprint");
                Ok(())
            }
            Err(error) => {
                error.log_if_security_critical();
                println!("❌ {host}: {}", error.reason());
                Err(error.into())
            }
        },
        None => {
            println!("⚠️  {host}: no pins configured, pinning not applied");
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Algorithm")]
    algorithm: String,
    #[tabled(rename = "Pins")]
    pins: usize,
}

fn validate_command(config_path: &Path) -> Result<()> {
    let config = PinningConfig::load(config_path)?;
    let warnings = config.validate()?;

    let rows: Vec<HostRow> = config
        .hosts
        .iter()
        .map(|(host, entry)| HostRow {
            host: host.clone(),
            algorithm: config.algorithm_for(entry).to_string(),
            pins: entry.pins.len(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");

    if config.all_hosts_must_be_evaluated {
        println!("Unlisted hosts: refused");
    } else {
        println!("Unlisted hosts: not pinned");
    }

    if warnings.is_empty() {
        println!("✅ {} is valid", config_path.display());
    } else {
        for warning in &warnings {
            println!("⚠️  {warning}");
        }
        println!(
            "{} pin(s) can never match and should be fixed",
            warnings.len()
        );
    }

    Ok(())
}
