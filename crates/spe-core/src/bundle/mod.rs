//! Proof bundle assembly and the symmetric offline verifier.
//!
//! A bundle is a single ZIP archive with fixed member names:
//!
//! ```text
//! forensic_capsule.json      the attestation record
//! ledger.sqlite              the hash-chain ledger
//! proof_input.json           the (optionally signed) manifest
//! verify/verify_bundle.py    hermetic zero-dependency verifier
//! ```
//!
//! Additional members are permitted and ignored. Verification needs no
//! network, server, or state beyond the bundle itself; the embedded Python
//! verifier reproduces the same verdict surface with nothing but a stock
//! interpreter.

mod verdict;

pub use verdict::{OriginStatus, ObjectStatus, Verdict, VerdictReport};

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::capsule::{capsule_hash_from_value, strip_hash_prefix};
use crate::crypto::{sha256_file_hex, SignatureStatus, PUBLIC_KEY_SIZE};
use crate::error::SpeError;
use crate::ledger::AttestationLedger;
use crate::manifest::ProofInputManifest;

/// Bundle member: the forensic capsule.
pub const CAPSULE_MEMBER: &str = "forensic_capsule.json";

/// Bundle member: the hash-chain ledger.
pub const LEDGER_MEMBER: &str = "ledger.sqlite";

/// Bundle member: the proof-input manifest.
pub const PROOF_INPUT_MEMBER: &str = "proof_input.json";

/// Bundle member: the embedded verifier.
pub const VERIFIER_MEMBER: &str = "verify/verify_bundle.py";

/// The embedded verifier source, shipped inside every bundle.
pub const VERIFIER_SOURCE: &str = include_str!("verify_bundle.py");

/// Returns the conventional bundle file name for a generation instant.
#[must_use]
pub fn bundle_file_name(at: chrono::DateTime<Utc>) -> String {
    format!("SPE_Proof_{}.zip", at.format("%Y%m%d_%H%M%S"))
}

/// Assembles a proof bundle from the three on-disk artifacts.
///
/// The ledger file must be closed (no live connections) before assembly so
/// the archived copy is a consistent snapshot.
pub fn assemble(
    bundle_path: &Path,
    capsule_json: &str,
    ledger_path: &Path,
    proof_input_json: &str,
) -> Result<(), SpeError> {
    let mut ledger_bytes = Vec::new();
    File::open(ledger_path)?.read_to_end(&mut ledger_bytes)?;

    let file = File::create(bundle_path)?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    archive.start_file(CAPSULE_MEMBER, options)?;
    archive.write_all(capsule_json.as_bytes())?;

    archive.start_file(LEDGER_MEMBER, options)?;
    archive.write_all(&ledger_bytes)?;

    archive.start_file(PROOF_INPUT_MEMBER, options)?;
    archive.write_all(proof_input_json.as_bytes())?;

    archive.start_file(VERIFIER_MEMBER, options)?;
    archive.write_all(VERIFIER_SOURCE.as_bytes())?;

    archive.finish()?;
    Ok(())
}

/// What to verify and against what.
#[derive(Debug, Default)]
pub struct VerifyOptions {
    /// Path to the original artifact; when set, its hash is compared to the
    /// capsule's `output_hash` and an `OBJECT` verdict is emitted.
    pub artifact: Option<PathBuf>,

    /// Explicit path to a proof-input manifest, overriding the bundle
    /// member.
    pub proof_input: Option<PathBuf>,

    /// A well-known production public key; when set, `ORIGIN_SPE` reports
    /// whether the manifest's attached key matches it.
    pub known_key: Option<[u8; PUBLIC_KEY_SIZE]>,
}

/// Verifies a bundle archive end-to-end.
///
/// Extracts to a temporary directory and runs the same procedure as
/// [`verify_parts`].
pub fn verify_archive(bundle_path: &Path, options: &VerifyOptions) -> Result<VerdictReport, SpeError> {
    let workspace = TempDir::new()?;
    let file = File::open(bundle_path)
        .map_err(|e| SpeError::BundleMalformed(format!("cannot open bundle: {e}")))?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(workspace.path())?;

    let capsule_path = workspace.path().join(CAPSULE_MEMBER);
    let ledger_path = workspace.path().join(LEDGER_MEMBER);
    if !capsule_path.is_file() {
        return Err(SpeError::BundleMalformed(format!(
            "missing required member {CAPSULE_MEMBER}"
        )));
    }
    if !ledger_path.is_file() {
        return Err(SpeError::BundleMalformed(format!(
            "missing required member {LEDGER_MEMBER}"
        )));
    }

    let bundled_manifest = workspace.path().join(PROOF_INPUT_MEMBER);
    let mut options_with_member = VerifyOptions {
        artifact: options.artifact.clone(),
        proof_input: options.proof_input.clone(),
        known_key: options.known_key,
    };
    if options_with_member.proof_input.is_none() && bundled_manifest.is_file() {
        options_with_member.proof_input = Some(bundled_manifest);
    }

    verify_parts(&capsule_path, &ledger_path, &options_with_member)
}

/// Verifies loose bundle parts: a capsule file and a ledger file.
///
/// Every verdict is computed independently; a broken chain does not
/// suppress the object check, and vice versa.
pub fn verify_parts(
    capsule_path: &Path,
    ledger_path: &Path,
    options: &VerifyOptions,
) -> Result<VerdictReport, SpeError> {
    // 1. Recompute the capsule hash from the literal file content.
    let capsule_bytes = std::fs::read(capsule_path)
        .map_err(|e| SpeError::BundleMalformed(format!("cannot read capsule: {e}")))?;
    let capsule_value: serde_json::Value = serde_json::from_slice(&capsule_bytes)
        .map_err(|e| SpeError::BundleMalformed(format!("capsule is not valid JSON: {e}")))?;
    let recomputed_capsule_hash = capsule_hash_from_value(&capsule_value)?;

    // 2. Walk the full chain. A bundle must bind at least one entry.
    let ledger = AttestationLedger::open_read_only(ledger_path)
        .map_err(|e| SpeError::BundleMalformed(format!("cannot open ledger: {e}")))?;
    let chain = ledger.verify()?;
    let entry_count = ledger.count()?;
    let ledger_verdict = Verdict::from_bool(chain.is_valid() && entry_count > 0);

    // 3. The canonical binding is the most recent entry for this capsule;
    //    the tip entry must reference it.
    let tip_entry = ledger.last_entry()?;
    let mut binding_ok = tip_entry
        .as_ref()
        .is_some_and(|entry| entry.capsule_hash == recomputed_capsule_hash);

    // 4. Manifest-dependent verdicts.
    let manifest = match &options.proof_input {
        Some(path) => {
            let bytes = std::fs::read(path)
                .map_err(|e| SpeError::BundleMalformed(format!("cannot read proof input: {e}")))?;
            Some(ProofInputManifest::from_json_slice(&bytes)?)
        }
        None => None,
    };

    let proof_input_hash = match &manifest {
        Some(manifest) => Some(manifest.hash()?),
        None => None,
    };

    // A capsule that carries proof_input_hash binds the manifest too: the
    // recomputed manifest hash must match it.
    if let Some(recorded) = capsule_value.get("proof_input_hash").and_then(|v| v.as_str()) {
        if let Some(recomputed) = &proof_input_hash {
            binding_ok &= recomputed.as_str() == recorded;
        }
    }

    let signature = match &manifest {
        Some(manifest) => manifest.verify_signature()?,
        None => SignatureStatus::Unknown,
    };

    let origin = origin_status(manifest.as_ref(), options.known_key.as_ref());

    // 5. Object check, only when an artifact was supplied.
    let object = match &options.artifact {
        Some(path) => {
            let file_hash = sha256_file_hex(path)?;
            let recorded = capsule_value
                .get("output_hash")
                .and_then(|v| v.as_str())
                .map(strip_hash_prefix)
                .unwrap_or_default();
            Some(ObjectStatus::from_bool(file_hash == recorded))
        }
        None => None,
    };

    Ok(VerdictReport {
        ledger: ledger_verdict,
        capsule_binding: Verdict::from_bool(binding_ok),
        proof_input_hash,
        signature,
        origin,
        object,
        capsule_hash: recomputed_capsule_hash,
    })
}

fn origin_status(
    manifest: Option<&ProofInputManifest>,
    known_key: Option<&[u8; PUBLIC_KEY_SIZE]>,
) -> OriginStatus {
    let (Some(manifest), Some(known_key)) = (manifest, known_key) else {
        return OriginStatus::Unknown;
    };
    let Some(block) = manifest.signature_block() else {
        return OriginStatus::Unknown;
    };
    match crate::crypto::decode_public_key(&block.public_key) {
        Ok(attached) if &attached == known_key => OriginStatus::Known,
        _ => OriginStatus::Unknown,
    }
}
