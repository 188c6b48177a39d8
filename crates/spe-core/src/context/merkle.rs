//! Merkle root over context-item leaves.
//!
//! The root summarizes the ordered sequence of leaves:
//!
//! - Empty set: SHA-256 of the empty byte string.
//! - Otherwise: hash each leaf's canonical bytes, then pair adjacent digests
//!   left-to-right with `SHA-256(left ‖ right)` over the raw 32-byte
//!   digests, duplicating the last digest when a level has an odd count,
//!   until a single digest remains.
//!
//! The root is order-sensitive; see
//! [`sort_for_attestation`](super::sort_for_attestation) for callers that
//! want a set-independent root.

use crate::canonical::CanonicalError;
use crate::crypto::{sha256, sha256_hex, HASH_SIZE};

use super::ContextItem;

/// Computes the Merkle root of an ordered context sequence, lower-case hex.
///
/// # Errors
///
/// Returns an error if an item cannot be canonicalized.
pub fn merkle_root(items: &[ContextItem]) -> Result<String, CanonicalError> {
    if items.is_empty() {
        return Ok(sha256_hex(b""));
    }

    let mut level: Vec<[u8; HASH_SIZE]> = Vec::with_capacity(items.len());
    for item in items {
        level.push(sha256(item.leaf_bytes()?.as_bytes()));
    }

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = *level.last().expect("level is non-empty");
            level.push(last);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut combined = [0u8; HASH_SIZE * 2];
                combined[..HASH_SIZE].copy_from_slice(&pair[0]);
                combined[HASH_SIZE..].copy_from_slice(&pair[1]);
                sha256(&combined)
            })
            .collect();
    }

    let root = level[0];
    Ok(root.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(doc_id: &str, timestamp: i64) -> ContextItem {
        ContextItem {
            doc_id: doc_id.to_string(),
            content_hash: "0".repeat(64),
            timestamp,
            source_id: "src".to_string(),
        }
    }

    fn leaf_digest(i: &ContextItem) -> [u8; HASH_SIZE] {
        sha256(i.leaf_bytes().expect("failed to canonicalize").as_bytes())
    }

    fn combine(left: [u8; HASH_SIZE], right: [u8; HASH_SIZE]) -> [u8; HASH_SIZE] {
        let mut buf = [0u8; HASH_SIZE * 2];
        buf[..HASH_SIZE].copy_from_slice(&left);
        buf[HASH_SIZE..].copy_from_slice(&right);
        sha256(&buf)
    }

    fn hex(digest: [u8; HASH_SIZE]) -> String {
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn empty_set_is_hash_of_empty_string() {
        assert_eq!(
            merkle_root(&[]).expect("failed to compute root"),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn single_leaf_root_is_leaf_digest() {
        let a = item("a", 1);
        let root = merkle_root(std::slice::from_ref(&a)).expect("failed to compute root");
        assert_eq!(root, hex(leaf_digest(&a)));
    }

    #[test]
    fn two_leaves_pair_left_to_right() {
        let (a, b) = (item("a", 1), item("b", 2));
        let root = merkle_root(&[a.clone(), b.clone()]).expect("failed to compute root");
        assert_eq!(root, hex(combine(leaf_digest(&a), leaf_digest(&b))));
    }

    #[test]
    fn odd_count_duplicates_last_leaf() {
        let (a, b, c) = (item("a", 1), item("b", 2), item("c", 3));
        let root =
            merkle_root(&[a.clone(), b.clone(), c.clone()]).expect("failed to compute root");
        let left = combine(leaf_digest(&a), leaf_digest(&b));
        let right = combine(leaf_digest(&c), leaf_digest(&c));
        assert_eq!(root, hex(combine(left, right)));
    }

    #[test]
    fn any_field_change_moves_the_root() {
        let base = vec![item("a", 1), item("b", 2)];
        let root = merkle_root(&base).expect("failed to compute root");

        let mut changed = base.clone();
        changed[1].timestamp = 3;
        assert_ne!(root, merkle_root(&changed).expect("failed to compute root"));

        let mut changed = base.clone();
        changed[0].content_hash = "1".repeat(64);
        assert_ne!(root, merkle_root(&changed).expect("failed to compute root"));

        let mut changed = base.clone();
        changed[0].source_id.push('x');
        assert_ne!(root, merkle_root(&changed).expect("failed to compute root"));
    }

    #[test]
    fn order_matters() {
        let (a, b) = (item("a", 1), item("b", 2));
        let forward = merkle_root(&[a.clone(), b.clone()]).expect("failed to compute root");
        let reverse = merkle_root(&[b, a]).expect("failed to compute root");
        assert_ne!(forward, reverse);
    }
}
