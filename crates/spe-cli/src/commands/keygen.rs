//! `spe keygen` - generate an Ed25519 signing seed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::RngCore;
use zeroize::Zeroizing;

use spe_core::crypto::{encode_base64, public_key_of, SEED_SIZE};

/// Arguments for key generation.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the base64 seed to this file (printed to stdout otherwise)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Generates a fresh seed and prints (or writes) it with its public key.
pub fn run(args: &KeygenArgs) -> Result<()> {
    let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
    rand::rngs::OsRng.fill_bytes(&mut *seed);

    let seed_b64 = Zeroizing::new(encode_base64(&*seed));
    let public_b64 = encode_base64(&public_key_of(&seed));

    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{}\n", *seed_b64))
                .with_context(|| format!("cannot write seed to {}", path.display()))?;
            println!("seed written to {}", path.display());
        }
        None => println!("seed:       {}", *seed_b64),
    }
    println!("public_key: {public_b64}");
    Ok(())
}
