//! Canonical serialization: deterministic byte production.
//!
//! This module defines [`CanonicalBytes`], the sole construction path for
//! bytes used in digest and signature computation across the engine.
//!
//! # Rules
//!
//! - Mapping keys are sorted lexicographically by code point.
//! - Separators are `,` between elements and `:` between key and value, with
//!   no surrounding whitespace.
//! - Non-ASCII characters are emitted verbatim (UTF-8, no `\u` escaping);
//!   quotes, backslashes, and control characters use standard JSON escaping.
//! - Mapping fields whose value is null are omitted, at every nesting level.
//! - Integers are rendered without exponent. Floats are rejected: records
//!   are trees of strings, integers, booleans, nulls, sequences, and
//!   mappings only.
//!
//! Two semantically equal records therefore produce byte-equal output on any
//! platform.
//!
//! # Invariant
//!
//! The newtype has a private inner field; the only way to construct it is
//! [`CanonicalBytes::new`], so every digest in the engine flows through the
//! same pipeline.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error during canonical serialization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CanonicalError {
    /// Float values are not permitted in canonical records.
    #[error("float value {0} is not permitted in a canonical record; use a string or integer")]
    FloatRejected(f64),

    /// The value could not be serialized to JSON (e.g. non-string map keys).
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Bytes produced exclusively by the canonicalization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalizes any serializable record.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::FloatRejected`] if the record contains a
    /// number not representable as `i64`/`u64`, or
    /// [`CanonicalError::SerializationFailed`] if serde cannot produce JSON
    /// (non-string mapping keys, non-finite numbers).
    pub fn new(record: &impl Serialize) -> Result<Self, CanonicalError> {
        let value = serde_json::to_value(record)?;
        let pruned = prune(value)?;
        // serde_json's default Map is BTreeMap-backed: keys come out sorted
        // by code point, separators are minimal, non-ASCII stays verbatim.
        let bytes = serde_json::to_vec(&pruned)?;
        Ok(Self(bytes))
    }

    /// The canonical bytes, for digest or signature computation.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively drops null-valued mapping fields and rejects floats.
///
/// Nulls inside sequences are preserved: array positions are not fields.
fn prune(value: Value) -> Result<Value, CanonicalError> {
    match value {
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                // as_f64 on an f64-only Number cannot fail.
                return Err(CanonicalError::FloatRejected(n.as_f64().unwrap_or(0.0)));
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let mut pruned = serde_json::Map::new();
            for (key, inner) in map {
                if inner.is_null() {
                    continue;
                }
                pruned.insert(key, prune(inner)?);
            }
            Ok(Value::Object(pruned))
        }
        Value::Array(seq) => {
            let pruned: Result<Vec<_>, _> = seq.into_iter().map(prune).collect();
            Ok(Value::Array(pruned?))
        }
        other => Ok(other),
    }
}
