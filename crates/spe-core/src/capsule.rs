//! The forensic capsule: the immutable attestation record for one artifact
//! at one moment.
//!
//! A capsule captures what was certified (`output_hash`), when (`t_run`,
//! `t_target`), which model produced it (`model_id`), what prompt was used
//! (`hash_prompt`), what context was available (`context_merkle_root`), and
//! under what gating policy (`gate_policy_id`). Its hash, the SHA-256 of
//! its canonical bytes, is the stable identifier the ledger chains over.
//!
//! Canonical bytes always carry `output_hash` as raw lower-case hex; the
//! `sha256:`-prefixed form is a display convention only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::CanonicalBytes;
use crate::crypto::{sha256_hex, HASH_HEX_LEN};
use crate::error::SpeError;

/// The default hash algorithm identifier.
pub const DEFAULT_HASH_ALG: &str = "sha256";

/// Immutable attestation record. Construct it, hash it, never touch it
/// again; a capsule that has been hashed must not be mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicCapsule {
    /// Unix timestamp (seconds) when the attestation was generated.
    pub t_run: i64,

    /// The declared temporal boundary (bare year or epoch seconds; the
    /// caller's unit, applied verbatim by the gate).
    pub t_target: i64,

    /// Gating policy identifier (`"strict"`, `"none"`).
    pub gate_policy_id: String,

    /// Model identifier (e.g. `"gpt-4"`, `"claude-3"`).
    pub model_id: String,

    /// SHA-256 hash of the prompt, lower-case hex; empty when no prompt was
    /// captured.
    pub hash_prompt: String,

    /// SHA-256 hash of the certified output, lower-case hex. An optional
    /// `sha256:` prefix is tolerated on input; canonical bytes use the raw
    /// hex.
    pub output_hash: String,

    /// Merkle root of the gated context set, lower-case hex.
    pub context_merkle_root: String,

    /// Artifact type (`"ai-output"`, `"pdf"`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,

    /// Certification mode (`"text"`, `"file"`, `"hash-only"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Hash algorithm identifier; conceptually defaults to `"sha256"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_alg: Option<String>,

    /// Hash of an environment snapshot, if one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_hash: Option<String>,

    /// Hash of the retrieval-index snapshot, if one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_snapshot_hash: Option<String>,

    /// Identifier of the normalization parameter set applied to the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization_params_id: Option<String>,

    /// The proof-input manifest carried inline, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_input: Option<Value>,

    /// Hash of the manifest's non-signature canonical bytes, when carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_input_hash: Option<String>,
}

impl ForensicCapsule {
    /// Creates a capsule from the required fields; optional fields start
    /// unset and may be filled before the first hash.
    #[must_use]
    pub fn new(
        t_run: i64,
        t_target: i64,
        gate_policy_id: impl Into<String>,
        model_id: impl Into<String>,
        hash_prompt: impl Into<String>,
        output_hash: impl Into<String>,
        context_merkle_root: impl Into<String>,
    ) -> Self {
        Self {
            t_run,
            t_target,
            gate_policy_id: gate_policy_id.into(),
            model_id: model_id.into(),
            hash_prompt: hash_prompt.into(),
            output_hash: output_hash.into(),
            context_merkle_root: context_merkle_root.into(),
            artifact_type: None,
            mode: None,
            hash_alg: None,
            snapshot_hash: None,
            index_snapshot_hash: None,
            normalization_params_id: None,
            proof_input: None,
            proof_input_hash: None,
        }
    }

    /// Validates field invariants before hashing.
    ///
    /// # Errors
    ///
    /// Returns [`SpeError::InvalidInput`] when a hash field is malformed.
    /// `hash_prompt` may be empty (no prompt captured); the other hashes
    /// must be 64 lower-case hex characters, with an optional `sha256:`
    /// prefix tolerated on `output_hash`.
    pub fn validate(&self) -> Result<(), SpeError> {
        if !self.hash_prompt.is_empty() && !is_hex64(&self.hash_prompt) {
            return Err(SpeError::InvalidInput(
                "hash_prompt must be empty or 64 lower-case hex characters".to_string(),
            ));
        }
        if !is_hex64(strip_hash_prefix(&self.output_hash)) {
            return Err(SpeError::InvalidInput(
                "output_hash must be 64 lower-case hex characters".to_string(),
            ));
        }
        if !is_hex64(&self.context_merkle_root) {
            return Err(SpeError::InvalidInput(
                "context_merkle_root must be 64 lower-case hex characters".to_string(),
            ));
        }
        if let Some(pi_hash) = &self.proof_input_hash {
            if !is_hex64(pi_hash) {
                return Err(SpeError::InvalidInput(
                    "proof_input_hash must be 64 lower-case hex characters".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The capsule's canonical bytes: sorted keys, minimal separators,
    /// unset fields absent, `output_hash` as raw hex.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, SpeError> {
        let mut raw = self.clone();
        raw.output_hash = strip_hash_prefix(&raw.output_hash).to_string();
        Ok(CanonicalBytes::new(&raw)?)
    }

    /// SHA-256 of the canonical bytes, lower-case hex. The stable
    /// identifier referenced by the ledger.
    pub fn capsule_hash(&self) -> Result<String, SpeError> {
        Ok(sha256_hex(self.canonical_bytes()?.as_bytes()))
    }

    /// Renders the capsule as pretty-printed JSON with sorted keys, for the
    /// bundle's `forensic_capsule.json`.
    pub fn to_json_pretty(&self) -> Result<String, SpeError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Parses a capsule from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SpeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Recomputes a capsule hash from the literal content of a capsule file.
///
/// Works on the parsed JSON value rather than [`ForensicCapsule`] so that
/// foreign fields in the file still participate in the hash.
pub fn capsule_hash_from_value(value: &Value) -> Result<String, SpeError> {
    Ok(sha256_hex(CanonicalBytes::new(value)?.as_bytes()))
}

/// Strips a leading `<alg>:` prefix from a hash, if present.
#[must_use]
pub fn strip_hash_prefix(hash: &str) -> &str {
    hash.split_once(':').map_or(hash, |(_, hex)| hex)
}

/// Renders the display form of a hash: `sha256:<hex>`.
#[must_use]
pub fn normalize_hash(hash: &str, alg: &str) -> String {
    let trimmed = hash.trim().to_lowercase();
    if trimmed.contains(':') {
        trimmed
    } else {
        format!("{alg}:{trimmed}")
    }
}

fn is_hex64(s: &str) -> bool {
    s.len() == HASH_HEX_LEN && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capsule() -> ForensicCapsule {
        ForensicCapsule::new(
            1_234_567_890,
            2026,
            "strict",
            "gpt-4",
            "",
            "b".repeat(64),
            "c".repeat(64),
        )
    }

    #[test]
    fn hash_is_deterministic() {
        let c = capsule();
        let h1 = c.capsule_hash().expect("failed to hash");
        let h2 = c.capsule_hash().expect("failed to hash");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), HASH_HEX_LEN);
    }

    #[test]
    fn unset_fields_are_absent_from_canonical_bytes() {
        let c = capsule();
        let bytes = c.canonical_bytes().expect("failed to canonicalize");
        let text = std::str::from_utf8(bytes.as_bytes()).expect("invalid UTF-8");
        assert!(!text.contains("artifact_type"));
        assert!(!text.contains("snapshot_hash"));

        let mut with_optional = capsule();
        with_optional.artifact_type = Some("ai-output".to_string());
        assert_ne!(
            c.capsule_hash().expect("failed to hash"),
            with_optional.capsule_hash().expect("failed to hash"),
        );
    }

    #[test]
    fn prefixed_output_hash_canonicalizes_to_raw_hex() {
        let raw = capsule();
        let mut prefixed = capsule();
        prefixed.output_hash = format!("sha256:{}", "b".repeat(64));
        assert_eq!(
            raw.capsule_hash().expect("failed to hash"),
            prefixed.capsule_hash().expect("failed to hash"),
        );
    }

    #[test]
    fn any_field_change_moves_the_hash() {
        let base = capsule().capsule_hash().expect("failed to hash");

        let mut changed = capsule();
        changed.t_run += 1;
        assert_ne!(base, changed.capsule_hash().expect("failed to hash"));

        let mut changed = capsule();
        changed.model_id = "claude-3".to_string();
        assert_ne!(base, changed.capsule_hash().expect("failed to hash"));
    }

    #[test]
    fn file_round_trip_recomputes_identically() {
        let c = capsule();
        let expected = c.capsule_hash().expect("failed to hash");

        let json = c.to_json_pretty().expect("failed to render");
        let value: Value = serde_json::from_str(&json).expect("failed to parse");
        let recomputed = capsule_hash_from_value(&value).expect("failed to rehash");
        assert_eq!(expected, recomputed);

        let reparsed = ForensicCapsule::from_json_slice(json.as_bytes()).expect("failed to parse");
        assert_eq!(reparsed, c);
        assert_eq!(reparsed.capsule_hash().expect("failed to hash"), expected);
    }

    #[test]
    fn validation_rejects_malformed_hashes() {
        let mut bad = capsule();
        bad.output_hash = "zz".repeat(32);
        assert!(bad.validate().is_err());

        let mut bad = capsule();
        bad.context_merkle_root = "abc".to_string();
        assert!(bad.validate().is_err());

        assert!(capsule().validate().is_ok());
    }

    #[test]
    fn hash_prefix_helpers() {
        assert_eq!(strip_hash_prefix("sha256:abcd"), "abcd");
        assert_eq!(strip_hash_prefix("abcd"), "abcd");
        assert_eq!(normalize_hash("ABCD", "sha256"), "sha256:abcd");
        assert_eq!(normalize_hash("sha256:abcd", "sha256"), "sha256:abcd");
    }
}
