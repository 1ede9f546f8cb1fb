//! certpin - certificate pinning by fingerprint comparison
//!
//! Command line front end for the pinning evaluator in `certpin_core`

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod certs;
mod pin_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "certpin",
    about = "Certificate pinning by fingerprint comparison",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: pin_cli::PinCommand,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,
}

fn initialize_logging(log_level: &LogLevel, json: bool) {
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr) // Critical: logs to stderr, not stdout
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr) // Critical: logs to stderr, not stdout
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli.log_level, cli.log_json);

    debug!("Running command: {:?}", cli.command);
    cli.command.execute()
}
