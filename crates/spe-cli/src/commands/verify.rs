//! `spe verify` - verify a proof bundle offline.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use spe_core::bundle::{verify_parts, VerifyOptions};
use spe_core::crypto::{decode_public_key, PUBLIC_KEY_SIZE};
use spe_core::engine::verify_proof;

/// Environment variable naming a file that holds the well-known production
/// public key (base64) for the `ORIGIN_SPE` verdict.
const PRODUCTION_KEY_ENV: &str = "SPE_PRODUCTION_KEY";

/// Arguments for bundle verification.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to a proof bundle archive
    #[arg(long, conflicts_with_all = ["capsule", "ledger"])]
    pub bundle: Option<PathBuf>,

    /// Path to a loose forensic capsule JSON file
    #[arg(long, requires = "ledger")]
    pub capsule: Option<PathBuf>,

    /// Path to a loose ledger file
    #[arg(long, requires = "capsule")]
    pub ledger: Option<PathBuf>,

    /// Original artifact; enables the OBJECT verdict
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Explicit proof-input manifest, overriding the bundle member
    #[arg(long)]
    pub proof_input: Option<PathBuf>,

    /// File holding the base64 production public key for ORIGIN_SPE
    /// (defaults to the SPE_PRODUCTION_KEY environment variable)
    #[arg(long)]
    pub known_key: Option<PathBuf>,
}

/// Runs verification, prints the verdict block, and returns whether every
/// applicable verdict passed.
pub fn run(args: &VerifyArgs) -> Result<bool> {
    let options = VerifyOptions {
        artifact: args.file.clone(),
        proof_input: args.proof_input.clone(),
        known_key: load_known_key(args)?,
    };

    let report = match (&args.bundle, &args.capsule, &args.ledger) {
        (Some(bundle), None, None) => verify_proof(bundle, &options)?,
        (None, Some(capsule), Some(ledger)) => verify_parts(capsule, ledger, &options)?,
        _ => bail!("provide --bundle, or both --capsule and --ledger"),
    };

    print!("{report}");
    Ok(report.passed())
}

fn load_known_key(args: &VerifyArgs) -> Result<Option<[u8; PUBLIC_KEY_SIZE]>> {
    let path = match &args.known_key {
        Some(path) => Some(path.clone()),
        None => std::env::var_os(PRODUCTION_KEY_ENV).map(PathBuf::from),
    };
    let Some(path) = path else {
        return Ok(None);
    };
    let b64 = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read known-key file {}", path.display()))?;
    let key = decode_public_key(&b64)
        .with_context(|| format!("known-key file {} is not a base64 32-byte key", path.display()))?;
    Ok(Some(key))
}
