//! Ed25519 signing and verification over canonical bytes.
//!
//! Signing takes a 32-byte seed and a message; verification takes a 32-byte
//! public key, the message, and a 64-byte signature. Keys and signatures
//! travel as standard Base64. Seeds are held in [`Zeroizing`] buffers so the
//! secret material is wiped on drop.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use thiserror::Error;
use zeroize::Zeroizing;

/// Size of an Ed25519 seed (secret key) in bytes.
pub const SEED_SIZE: usize = 32;

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Errors from key and signature decoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignError {
    /// The Base64 payload could not be decoded.
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decoded key or signature has the wrong length.
    #[error("wrong {what} length: expected {expected} bytes, got {actual}")]
    WrongLength {
        /// What was being decoded ("seed", "public key", "signature").
        what: &'static str,
        /// The expected byte length.
        expected: usize,
        /// The actual byte length.
        actual: usize,
    },
}

/// Outcome of a signature check, as it appears on the verdict surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Cryptographic verification accepted.
    Valid,
    /// Cryptographic verification rejected.
    Invalid,
    /// No signature present, or no verifier available. Never `Valid`.
    Unknown,
}

impl SignatureStatus {
    /// The string rendered on the verdict surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Signs a message with an Ed25519 seed per RFC 8032.
#[must_use]
pub fn sign(seed: &[u8; SEED_SIZE], message: &[u8]) -> [u8; SIGNATURE_SIZE] {
    let signing_key = SigningKey::from_bytes(seed);
    signing_key.sign(message).to_bytes()
}

/// Derives the public key for a seed.
#[must_use]
pub fn public_key_of(seed: &[u8; SEED_SIZE]) -> [u8; PUBLIC_KEY_SIZE] {
    SigningKey::from_bytes(seed).verifying_key().to_bytes()
}

/// Verifies a signature over a message.
///
/// A public key that does not decode to a valid curve point rejects, the
/// same as a bad signature.
#[must_use]
pub fn verify(
    public_key: &[u8; PUBLIC_KEY_SIZE],
    message: &[u8],
    signature: &[u8; SIGNATURE_SIZE],
) -> SignatureStatus {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return SignatureStatus::Invalid;
    };
    let signature = Signature::from_bytes(signature);
    if verifying_key.verify(message, &signature).is_ok() {
        SignatureStatus::Valid
    } else {
        SignatureStatus::Invalid
    }
}

/// Encodes bytes as standard Base64.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a Base64 Ed25519 seed, enforcing the 32-byte length.
pub fn decode_seed(b64: &str) -> Result<Zeroizing<[u8; SEED_SIZE]>, SignError> {
    let bytes = Zeroizing::new(STANDARD.decode(b64.trim())?);
    let array: [u8; SEED_SIZE] = bytes.as_slice().try_into().map_err(|_| {
        SignError::WrongLength {
            what: "seed",
            expected: SEED_SIZE,
            actual: bytes.len(),
        }
    })?;
    Ok(Zeroizing::new(array))
}

/// Decodes a Base64 Ed25519 public key, enforcing the 32-byte length.
pub fn decode_public_key(b64: &str) -> Result<[u8; PUBLIC_KEY_SIZE], SignError> {
    let bytes = STANDARD.decode(b64.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| SignError::WrongLength {
            what: "public key",
            expected: PUBLIC_KEY_SIZE,
            actual: bytes.len(),
        })
}

/// Decodes a Base64 Ed25519 signature, enforcing the 64-byte length.
pub fn decode_signature(b64: &str) -> Result<[u8; SIGNATURE_SIZE], SignError> {
    let bytes = STANDARD.decode(b64.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| SignError::WrongLength {
            what: "signature",
            expected: SIGNATURE_SIZE,
            actual: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_seed() -> [u8; SEED_SIZE] {
        let mut seed = [0u8; SEED_SIZE];
        for (i, byte) in seed.iter_mut().enumerate() {
            *byte = i as u8;
        }
        seed
    }

    #[test]
    fn sign_verify_round_trip() {
        let seed = test_seed();
        let message = b"canonical manifest bytes";
        let signature = sign(&seed, message);
        let public_key = public_key_of(&seed);
        assert_eq!(
            verify(&public_key, message, &signature),
            SignatureStatus::Valid
        );
    }

    #[test]
    fn tampered_message_rejects() {
        let seed = test_seed();
        let signature = sign(&seed, b"original");
        let public_key = public_key_of(&seed);
        assert_eq!(
            verify(&public_key, b"Original", &signature),
            SignatureStatus::Invalid
        );
    }

    #[test]
    fn tampered_signature_rejects() {
        let seed = test_seed();
        let message = b"payload";
        let mut signature = sign(&seed, message);
        signature[10] ^= 0x01;
        let public_key = public_key_of(&seed);
        assert_eq!(
            verify(&public_key, message, &signature),
            SignatureStatus::Invalid
        );
    }

    #[test]
    fn base64_codecs_enforce_lengths() {
        let seed = test_seed();
        let encoded = encode_base64(&seed);
        let decoded = decode_seed(&encoded).expect("failed to decode seed");
        assert_eq!(*decoded, seed);

        let short = encode_base64(&[1u8; 16]);
        assert!(matches!(
            decode_public_key(&short),
            Err(SignError::WrongLength { expected: 32, .. })
        ));
        assert!(matches!(
            decode_signature(&short),
            Err(SignError::WrongLength { expected: 64, .. })
        ));
    }
}
