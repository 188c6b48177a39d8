//! High-level proof generation and verification.
//!
//! [`generate_proof`] runs the whole pipeline for one artifact: output hash
//! → temporal gate → context Merkle root → manifest (optionally signed) →
//! capsule → ledger append → bundle assembly. Any error aborts the run
//! before the ledger append it has not yet performed, so a failed run
//! leaves no chain entry behind.
//!
//! Verification is symmetric and lives in [`crate::bundle`]; thin wrappers
//! are re-exported here for callers that think in terms of proofs rather
//! than archives.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::bundle::{self, VerdictReport, VerifyOptions};
use crate::capsule::{normalize_hash, ForensicCapsule, DEFAULT_HASH_ALG};
use crate::context::{merkle_root, ContextItem};
use crate::crypto::{sha256_file_hex, sha256_hex, SEED_SIZE};
use crate::error::SpeError;
use crate::ledger::{AttestationLedger, ChainStatus};
use crate::manifest::ProofInputManifest;
use crate::temporal::GatePolicy;

/// What is being certified.
#[derive(Debug, Clone)]
pub enum ProofSource {
    /// Certify text content (e.g. a model output).
    Text(String),
    /// Certify a file on disk.
    File(PathBuf),
    /// Certify a pre-computed SHA-256 hash (zero-upload mode).
    HashOnly(String),
}

impl ProofSource {
    /// The certification mode identifier recorded in capsule and manifest.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::File(_) => "file",
            Self::HashOnly(_) => "hash-only",
        }
    }
}

/// A certification request.
///
/// Deliberately not `Debug`: the signing seed must not leak into logs.
pub struct ProofRequest {
    /// What to certify.
    pub source: ProofSource,

    /// Declared temporal boundary; defaults to the generation instant
    /// (epoch seconds) when unset.
    pub t_target: Option<i64>,

    /// Gating policy for the context sequence.
    pub policy: GatePolicy,

    /// Artifact type recorded in capsule and manifest.
    pub artifact_type: String,

    /// Model identifier recorded in capsule and manifest.
    pub model_id: String,

    /// Context items available at generation time, in caller order.
    pub context: Vec<ContextItem>,

    /// Ed25519 seed for signing the manifest, when provided.
    pub signing_seed: Option<Zeroizing<[u8; SEED_SIZE]>>,

    /// Directory to write the bundle and its parts into; a fresh temporary
    /// directory is created when unset.
    pub out_dir: Option<PathBuf>,
}

impl ProofRequest {
    /// A request with the original defaults for everything but the source.
    #[must_use]
    pub fn new(source: ProofSource) -> Self {
        Self {
            source,
            t_target: None,
            policy: GatePolicy::Strict,
            artifact_type: "other".to_string(),
            model_id: "binary-object".to_string(),
            context: Vec::new(),
            signing_seed: None,
            out_dir: None,
        }
    }
}

/// Result of proof generation.
#[derive(Debug, Clone)]
pub struct ProofResult {
    /// Path of the assembled bundle archive.
    pub bundle_path: PathBuf,

    /// Directory holding the bundle and its loose parts.
    pub out_dir: PathBuf,

    /// Hash of the generated capsule.
    pub capsule_hash: String,

    /// Hash of the certified output, raw lower-case hex.
    pub output_hash: String,

    /// `entry_hash` of the ledger entry binding this capsule.
    pub ledger_tip: String,

    /// The certification mode that was applied.
    pub mode: &'static str,

    /// Whether the manifest carries a signature.
    pub signed: bool,
}

/// Generates a proof bundle for a certification request.
///
/// # Errors
///
/// Returns [`SpeError::InvalidInput`] for malformed inputs,
/// [`SpeError::ChainBroken`] when the output directory holds a ledger
/// whose chain no longer verifies, and storage or archive errors from the
/// output directory. No ledger entry is appended unless the returned
/// result exists.
pub fn generate_proof(request: &ProofRequest) -> Result<ProofResult, SpeError> {
    let now = Utc::now();
    let t_run = now.timestamp();
    let t_target = request.t_target.unwrap_or(t_run);
    let mode = request.source.mode();

    let output_hash = match &request.source {
        ProofSource::Text(content) => sha256_hex(content.as_bytes()),
        ProofSource::File(path) => sha256_file_hex(path)?,
        ProofSource::HashOnly(hex) => {
            let lowered = hex.trim().to_lowercase();
            if lowered.len() != 64 || !lowered.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(SpeError::InvalidInput(
                    "hash must be exactly 64 hex characters".to_string(),
                ));
            }
            lowered
        }
    };
    debug!(mode, %output_hash, "computed output hash");

    for item in &request.context {
        item.validate().map_err(SpeError::InvalidInput)?;
    }
    let gated = request.policy.apply(&request.context, t_target);
    let context_root = merkle_root(&gated.items)?;
    debug!(
        kept = gated.items.len(),
        supplied = request.context.len(),
        has_post_target = gated.has_post_target,
        "applied temporal gate"
    );

    let mut manifest = ProofInputManifest::standard(
        mode,
        &output_hash,
        t_run,
        &request.artifact_type,
        &request.model_id,
    );
    let signed = match &request.signing_seed {
        Some(seed) => {
            manifest.sign_with(seed)?;
            true
        }
        None => false,
    };
    let proof_input_hash = manifest.hash()?;

    let mut capsule = ForensicCapsule::new(
        t_run,
        t_target,
        request.policy.as_str(),
        &request.model_id,
        "",
        &output_hash,
        &context_root,
    );
    capsule.artifact_type = Some(request.artifact_type.clone());
    capsule.mode = Some(mode.to_string());
    capsule.hash_alg = Some(DEFAULT_HASH_ALG.to_string());
    capsule.proof_input_hash = Some(proof_input_hash);
    capsule.validate()?;
    let capsule_hash = capsule.capsule_hash()?;

    // All inputs are validated and hashed; only now touch the filesystem.
    let out_dir = match &request.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => tempfile::Builder::new()
            .prefix("spe_")
            .tempdir()?
            .keep(),
    };

    let capsule_json = capsule.to_json_pretty()?;
    let capsule_path = out_dir.join(bundle::CAPSULE_MEMBER);
    std::fs::write(&capsule_path, &capsule_json)?;

    // Reusing an output directory appends to its existing ledger; refuse
    // to extend a chain that no longer verifies.
    let ledger_path = out_dir.join(bundle::LEDGER_MEMBER);
    let ledger = AttestationLedger::open(&ledger_path)?;
    if let ChainStatus::Broken { id, details } = ledger.verify()? {
        return Err(SpeError::ChainBroken {
            seq_id: id,
            details,
        });
    }
    let ledger_tip = ledger.append(&capsule_hash, t_run)?;
    drop(ledger);

    let proof_input_json = manifest.to_json_pretty()?;
    std::fs::write(out_dir.join(bundle::PROOF_INPUT_MEMBER), &proof_input_json)?;

    let bundle_path = out_dir.join(bundle::bundle_file_name(now));
    bundle::assemble(&bundle_path, &capsule_json, &ledger_path, &proof_input_json)?;

    info!(
        bundle = %bundle_path.display(),
        %capsule_hash,
        signed,
        "assembled proof bundle"
    );

    Ok(ProofResult {
        bundle_path,
        out_dir,
        capsule_hash,
        output_hash,
        ledger_tip,
        mode,
        signed,
    })
}

/// Verifies a bundle archive. See [`bundle::verify_archive`].
pub fn verify_proof(bundle_path: &Path, options: &VerifyOptions) -> Result<VerdictReport, SpeError> {
    bundle::verify_archive(bundle_path, options)
}

/// Renders a human-readable proof block for a capsule and its ledger.
pub fn render_proof_block(
    capsule_path: &Path,
    ledger_path: &Path,
) -> Result<String, SpeError> {
    let capsule_bytes = std::fs::read(capsule_path)?;
    let capsule_value: Value = serde_json::from_slice(&capsule_bytes)?;
    let capsule_hash = crate::capsule::capsule_hash_from_value(&capsule_value)?;

    let ledger = AttestationLedger::open_read_only(ledger_path)?;
    let chain = ledger.verify()?;
    let count = ledger.count()?;
    let tip = ledger.tip()?.unwrap_or_else(|| "(empty)".to_string());

    let field = |key: &str| -> String {
        capsule_value
            .get(key)
            .map_or_else(|| "(unset)".to_string(), value_to_display)
    };
    let output_hash = capsule_value
        .get("output_hash")
        .and_then(Value::as_str)
        .map_or_else(|| "(unset)".to_string(), |h| normalize_hash(h, DEFAULT_HASH_ALG));

    let mut block = String::new();
    block.push_str("===== SPE PROOF =====\n");
    block.push_str(&format!("capsule_hash:        {capsule_hash}\n"));
    block.push_str(&format!("output_hash:         {output_hash}\n"));
    block.push_str(&format!("model_id:            {}\n", field("model_id")));
    block.push_str(&format!("mode:                {}\n", field("mode")));
    block.push_str(&format!("t_run:               {}\n", field("t_run")));
    block.push_str(&format!("t_target:            {}\n", field("t_target")));
    block.push_str(&format!("gate_policy:         {}\n", field("gate_policy_id")));
    block.push_str(&format!(
        "context_merkle_root: {}\n",
        field("context_merkle_root")
    ));
    block.push_str(&format!("ledger_entries:      {count}\n"));
    block.push_str(&format!("ledger_tip:          {tip}\n"));
    block.push_str(&format!(
        "chain:               {}\n",
        if chain.is_valid() { "VALID" } else { "INVALID" }
    ));
    block.push_str("=====================\n");
    Ok(block)
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
