//! Context items and context-set attestation.
//!
//! In retrieval-augmented workflows, each document available to the
//! generator at attestation time becomes a [`ContextItem`]. The ordered set
//! of items is summarized into a single Merkle root (see [`merkle_root`])
//! stored in the capsule, certifying exactly which information was
//! available.

mod merkle;

pub use merkle::merkle_root;

use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalBytes, CanonicalError};
use crate::crypto::HASH_HEX_LEN;

/// A single piece of context available at attestation time.
///
/// All four fields are required. Items are caller-owned and never mutated by
/// the engine; the temporal gate copies the items it retains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    /// Unique identifier for the document.
    pub doc_id: String,

    /// SHA-256 hash of the document content, lower-case hex.
    pub content_hash: String,

    /// Timestamp of the document's creation or retrieval, in the same unit
    /// as the attestation boundary (`t_target`).
    pub timestamp: i64,

    /// Identifier of the source system (e.g. `"rag-index-v2"`).
    pub source_id: String,
}

impl ContextItem {
    /// Validates the item's field invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant: `content_hash`
    /// must be 64 lower-case hex characters and `timestamp` must be
    /// non-negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.content_hash.len() != HASH_HEX_LEN
            || !self
                .content_hash
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(format!(
                "content_hash of {:?} must be {HASH_HEX_LEN} lower-case hex characters",
                self.doc_id
            ));
        }
        if self.timestamp < 0 {
            return Err(format!(
                "timestamp of {:?} must be non-negative, got {}",
                self.doc_id, self.timestamp
            ));
        }
        Ok(())
    }

    /// The item's Merkle leaf bytes: the canonical encoding of its
    /// four-field mapping.
    pub fn leaf_bytes(&self) -> Result<CanonicalBytes, CanonicalError> {
        CanonicalBytes::new(self)
    }
}

/// Sorts items into attestation order: `(doc_id, timestamp, source_id)`.
///
/// The Merkle root is order-sensitive; callers wanting a set-independent
/// root sort with this before attesting. The temporal gate itself preserves
/// caller order.
pub fn sort_for_attestation(items: &mut [ContextItem]) {
    items.sort_by(|a, b| {
        (&a.doc_id, a.timestamp, &a.source_id).cmp(&(&b.doc_id, b.timestamp, &b.source_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(doc_id: &str, timestamp: i64) -> ContextItem {
        ContextItem {
            doc_id: doc_id.to_string(),
            content_hash: "a".repeat(64),
            timestamp,
            source_id: "rag-index-v2".to_string(),
        }
    }

    #[test]
    fn leaf_bytes_are_deterministic_and_sorted() {
        let bytes = item("doc-1", 1_700_000_000)
            .leaf_bytes()
            .expect("failed to canonicalize");
        let expected = format!(
            r#"{{"content_hash":"{}","doc_id":"doc-1","source_id":"rag-index-v2","timestamp":1700000000}}"#,
            "a".repeat(64)
        );
        assert_eq!(bytes.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn validate_rejects_bad_hash() {
        let mut bad = item("doc-1", 0);
        bad.content_hash = "ABCD".repeat(16);
        assert!(bad.validate().is_err());

        bad.content_hash = "a".repeat(63);
        assert!(bad.validate().is_err());

        assert!(item("doc-1", 0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_timestamp() {
        assert!(item("doc-1", -1).validate().is_err());
    }

    #[test]
    fn attestation_sort_orders_by_triple() {
        let mut items = vec![item("b", 2), item("a", 2), item("a", 1)];
        sort_for_attestation(&mut items);
        let order: Vec<_> = items.iter().map(|i| (i.doc_id.as_str(), i.timestamp)).collect();
        assert_eq!(order, vec![("a", 1), ("a", 2), ("b", 2)]);
    }
}
