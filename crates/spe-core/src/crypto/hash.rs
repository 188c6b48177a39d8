//! SHA-256 hashing utilities.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Size of a SHA-256 digest in bytes.
pub const HASH_SIZE: usize = 32;

/// Length of a SHA-256 digest rendered as lower-case hex.
pub const HASH_HEX_LEN: usize = 64;

/// Block size for streaming file hashes (1 MiB).
const FILE_BLOCK_SIZE: usize = 1024 * 1024;

/// Computes the SHA-256 digest of a byte slice.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; HASH_SIZE] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    out
}

/// Computes the SHA-256 digest of a byte slice as lower-case hex.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&sha256(data))
}

/// Computes the SHA-256 digest of a file as lower-case hex.
///
/// Streams the file in 1 MiB blocks; the digest equals a single-shot hash of
/// the whole content.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read; the caller
/// treats this as a whole-operation failure.
pub fn sha256_file_hex(path: impl AsRef<Path>) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; FILE_BLOCK_SIZE];
    loop {
        let read = file.read(&mut block)?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&hasher.finalize());
    Ok(hex_encode(&out))
}

/// Encodes bytes as lower-case hex.
fn hex_encode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_input_matches_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn file_hash_matches_single_shot() {
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("artifact.bin");
        let content = vec![0xa5u8; 3 * 1024 * 1024 + 17];
        let mut file = File::create(&path).expect("failed to create file");
        file.write_all(&content).expect("failed to write file");
        drop(file);

        let streamed = sha256_file_hex(&path).expect("failed to hash file");
        assert_eq!(streamed, sha256_hex(&content));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(sha256_file_hex("/nonexistent/artifact.bin").is_err());
    }
}
