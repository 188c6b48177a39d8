//! The proof-input manifest: metadata about the certification request,
//! optionally signed.
//!
//! The manifest is an open key/value record (origin hints, artifact
//! metadata, timestamps). Its canonical form always excludes the
//! `signature` field, so signing is well-defined: sign the canonical bytes,
//! then attach the signature block. Verification strips the block,
//! recanonicalizes, and checks against the attached public key.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::canonical::CanonicalBytes;
use crate::crypto::{
    decode_public_key, decode_signature, encode_base64, public_key_of, sha256_hex, sign,
    verify, SignatureStatus, SEED_SIZE,
};
use crate::error::SpeError;

/// The manifest field that carries the signature block.
pub const SIGNATURE_FIELD: &str = "signature";

/// The only signature algorithm the engine produces or accepts.
pub const SIGNATURE_ALGORITHM: &str = "ed25519";

/// The detached signature block attached to a signed manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    /// Always `"ed25519"`.
    pub algorithm: String,

    /// Base64 of the 32-byte Ed25519 public key.
    pub public_key: String,

    /// Base64 of the 64-byte Ed25519 signature.
    pub signature_value: String,
}

/// A proof-input manifest: an ordered map of metadata fields plus an
/// optional signature block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofInputManifest {
    // serde_json's default Map is BTreeMap-backed, so iteration (and thus
    // serialization) is already in canonical key order.
    fields: Map<String, Value>,
}

impl ProofInputManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Builds the standard manifest for a certification request.
    #[must_use]
    pub fn standard(
        mode: &str,
        output_hash: &str,
        t_run: i64,
        artifact_type: &str,
        model_id: &str,
    ) -> Self {
        let mut manifest = Self::new();
        manifest.insert("schema_version", json!(format!("proof-input-{mode}/1.0")));
        manifest.insert("hash_algorithm", json!("sha256"));
        manifest.insert("hash_value", json!(output_hash));
        manifest.insert("t_run", json!(t_run));
        manifest.insert("mode", json!(mode));
        manifest.insert("artifact_type", json!(artifact_type));
        manifest.insert("model_id", json!(model_id));
        manifest.insert(
            "context",
            json!({"domain": artifact_type, "purpose": "attestation"}),
        );
        manifest
    }

    /// Parses a manifest from a JSON object value.
    pub fn from_value(value: Value) -> Result<Self, SpeError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(SpeError::InvalidInput(format!(
                "proof input must be a JSON object, got {other}"
            ))),
        }
    }

    /// Parses a manifest from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SpeError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Sets a metadata field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Reads a metadata field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The attached signature block, if the manifest carries one that
    /// parses.
    #[must_use]
    pub fn signature_block(&self) -> Option<SignatureBlock> {
        let block = self.fields.get(SIGNATURE_FIELD)?;
        serde_json::from_value(block.clone()).ok()
    }

    /// Whether a `signature` field is present at all (parsed or not).
    #[must_use]
    pub fn has_signature_field(&self) -> bool {
        self.fields.contains_key(SIGNATURE_FIELD)
    }

    /// The canonical bytes of the manifest with the `signature` field
    /// excluded.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, SpeError> {
        let mut unsigned = self.fields.clone();
        unsigned.remove(SIGNATURE_FIELD);
        Ok(CanonicalBytes::new(&unsigned)?)
    }

    /// SHA-256 of the non-signature canonical bytes, lower-case hex.
    ///
    /// This is the value recorded in the capsule as `proof_input_hash`.
    pub fn hash(&self) -> Result<String, SpeError> {
        Ok(sha256_hex(self.canonical_bytes()?.as_bytes()))
    }

    /// Signs the manifest and attaches the signature block, replacing any
    /// existing one.
    pub fn sign_with(&mut self, seed: &[u8; SEED_SIZE]) -> Result<(), SpeError> {
        let canonical = self.canonical_bytes()?;
        let signature = sign(seed, canonical.as_bytes());
        let block = SignatureBlock {
            algorithm: SIGNATURE_ALGORITHM.to_string(),
            public_key: encode_base64(&public_key_of(seed)),
            signature_value: encode_base64(&signature),
        };
        self.fields
            .insert(SIGNATURE_FIELD.to_string(), serde_json::to_value(block)?);
        Ok(())
    }

    /// Verifies the attached signature against the attached public key.
    ///
    /// Returns [`SignatureStatus::Unknown`] when no signature field is
    /// present, and [`SignatureStatus::Invalid`] when the block is present
    /// but malformed (wrong algorithm, bad encoding, wrong lengths) or the
    /// cryptographic check rejects.
    pub fn verify_signature(&self) -> Result<SignatureStatus, SpeError> {
        if !self.has_signature_field() {
            return Ok(SignatureStatus::Unknown);
        }
        let Some(block) = self.signature_block() else {
            return Ok(SignatureStatus::Invalid);
        };
        if block.algorithm != SIGNATURE_ALGORITHM {
            return Ok(SignatureStatus::Invalid);
        }
        let (Ok(public_key), Ok(signature)) = (
            decode_public_key(&block.public_key),
            decode_signature(&block.signature_value),
        ) else {
            return Ok(SignatureStatus::Invalid);
        };
        let canonical = self.canonical_bytes()?;
        Ok(verify(&public_key, canonical.as_bytes(), &signature))
    }

    /// Renders the manifest (including any signature block) as
    /// pretty-printed JSON with sorted keys, for the bundle's
    /// `proof_input.json`.
    pub fn to_json_pretty(&self) -> Result<String, SpeError> {
        Ok(serde_json::to_string_pretty(&Value::Object(
            self.fields.clone(),
        ))?)
    }
}

impl Default for ProofInputManifest {
    fn default() -> Self {
        Self::new()
    }
}
