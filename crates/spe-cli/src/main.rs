//! spe - Stateless Proof Engine CLI
//!
//! Thin front-end over `spe-core`: generate proof bundles, render proof
//! blocks, and verify bundles offline.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

/// spe - Stateless Proof Engine
#[derive(Parser, Debug)]
#[command(name = "spe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a proof bundle for text, a file, or a pre-computed hash
    Attest(commands::attest::AttestArgs),

    /// Render a human-readable proof block for a capsule and its ledger
    Proof(commands::proof::ProofArgs),

    /// Verify a proof bundle (or loose capsule + ledger) offline
    Verify(commands::verify::VerifyArgs),

    /// Generate an Ed25519 signing seed and its public key
    Keygen(commands::keygen::KeygenArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Attest(args) => commands::attest::run(&args)?,
        Commands::Proof(args) => commands::proof::run(&args)?,
        Commands::Verify(args) => {
            let passed = commands::verify::run(&args)?;
            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Keygen(args) => commands::keygen::run(&args)?,
    }

    Ok(ExitCode::SUCCESS)
}
