//! `spe proof` - render a human-readable proof block.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use spe_core::engine::render_proof_block;

/// Arguments for proof-block rendering.
#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Path to the forensic capsule JSON file
    #[arg(long)]
    pub capsule: PathBuf,

    /// Path to the ledger file
    #[arg(long)]
    pub ledger: PathBuf,
}

/// Renders the proof block to stdout.
pub fn run(args: &ProofArgs) -> Result<()> {
    let block = render_proof_block(&args.capsule, &args.ledger)?;
    print!("{block}");
    Ok(())
}
