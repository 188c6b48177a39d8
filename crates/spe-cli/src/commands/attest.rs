//! `spe attest` - generate a proof bundle.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use spe_core::context::ContextItem;
use spe_core::crypto::decode_seed;
use spe_core::engine::{generate_proof, ProofRequest, ProofSource};
use spe_core::temporal::GatePolicy;

/// Arguments for proof generation.
#[derive(Args, Debug)]
pub struct AttestArgs {
    /// Declared temporal boundary: a bare year or epoch seconds, applied
    /// verbatim against context timestamps. Defaults to the current epoch
    /// seconds.
    #[arg(long)]
    pub t_target: Option<i64>,

    /// Gating policy (`strict` or `none`)
    #[arg(long, default_value = "strict")]
    pub policy: String,

    /// Certify literal text content
    #[arg(long, conflicts_with_all = ["text_file", "file", "hash"])]
    pub text: Option<String>,

    /// Certify the content of a UTF-8 text file
    #[arg(long, conflicts_with_all = ["file", "hash"])]
    pub text_file: Option<PathBuf>,

    /// Certify a binary file
    #[arg(long, conflicts_with = "hash")]
    pub file: Option<PathBuf>,

    /// Certify a pre-computed SHA-256 hash (64 hex characters)
    #[arg(long)]
    pub hash: Option<String>,

    /// Model identifier recorded in the capsule
    #[arg(long, default_value = "binary-object")]
    pub model_id: String,

    /// Artifact type recorded in the capsule
    #[arg(long, default_value = "other")]
    pub artifact_type: String,

    /// File holding a base64 Ed25519 seed; when given, the manifest is
    /// signed
    #[arg(long)]
    pub sign_key_file: Option<PathBuf>,

    /// JSON file holding an array of context items to gate and attest
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Directory to write the bundle into
    #[arg(long)]
    pub out_dir: PathBuf,
}

/// Runs proof generation and prints a short summary.
pub fn run(args: &AttestArgs) -> Result<()> {
    let source = if let Some(text) = &args.text {
        ProofSource::Text(text.clone())
    } else if let Some(path) = &args.text_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read text file {}", path.display()))?;
        ProofSource::Text(content)
    } else if let Some(path) = &args.file {
        ProofSource::File(path.clone())
    } else if let Some(hash) = &args.hash {
        ProofSource::HashOnly(hash.clone())
    } else {
        bail!("provide one of --text, --text-file, --file, or --hash");
    };

    let Some(policy) = GatePolicy::parse(&args.policy) else {
        bail!("unknown policy {:?}; expected strict or none", args.policy);
    };

    let context = match &args.context_file {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("cannot read context file {}", path.display()))?;
            let items: Vec<ContextItem> =
                serde_json::from_slice(&bytes).context("context file must be a JSON array")?;
            items
        }
        None => Vec::new(),
    };

    let signing_seed = match &args.sign_key_file {
        Some(path) => {
            let b64 = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read key file {}", path.display()))?;
            Some(decode_seed(&b64).context("key file must hold a base64 32-byte seed")?)
        }
        None => None,
    };

    let request = ProofRequest {
        source,
        t_target: args.t_target,
        policy,
        artifact_type: args.artifact_type.clone(),
        model_id: args.model_id.clone(),
        context,
        signing_seed,
        out_dir: Some(args.out_dir.clone()),
    };

    let result = generate_proof(&request)?;

    println!("bundle:       {}", result.bundle_path.display());
    println!("capsule_hash: {}", result.capsule_hash);
    println!("output_hash:  {}", result.output_hash);
    println!("ledger_tip:   {}", result.ledger_tip);
    println!("mode:         {}", result.mode);
    println!("signed:       {}", result.signed);
    Ok(())
}
