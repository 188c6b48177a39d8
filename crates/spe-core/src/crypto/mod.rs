//! Cryptographic primitives for the proof pipeline.
//!
//! Two primitives cover the whole engine:
//!
//! - **SHA-256 hashing** for content fingerprints, Merkle leaves, capsule
//!   hashes, and the ledger chain
//! - **Ed25519 signatures** (RFC 8032) over canonical manifest bytes
//!
//! All hex output is lower-case; keys and signatures travel as standard
//! Base64.

mod hash;
mod sign;

pub use hash::{sha256, sha256_file_hex, sha256_hex, HASH_HEX_LEN, HASH_SIZE};
pub use sign::{
    decode_public_key, decode_seed, decode_signature, encode_base64, public_key_of, sign,
    verify, SignError, SignatureStatus, PUBLIC_KEY_SIZE, SEED_SIZE, SIGNATURE_SIZE,
};
