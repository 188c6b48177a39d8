//! Error types for the proof pipeline.
//!
//! Generation-time errors abort the run before the ledger append, so a
//! failed run leaves no chain entry. Verification-time failures are not
//! errors: they surface as verdict lines (see
//! [`crate::bundle::VerdictReport`]), and only I/O or malformed-input
//! conditions produce an `Err`. That is why there are no variants for
//! hash or signature mismatches; those outcomes are reported, not raised.

use thiserror::Error;

use crate::canonical::CanonicalError;
use crate::ledger::LedgerError;

/// Top-level error type for proof generation and verification.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeError {
    /// A required field is missing or an input value is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A ledger entry's `prev_hash` disagrees with its predecessor.
    ///
    /// Raised when a run would append to an existing ledger whose chain
    /// does not verify; the run aborts without mutating it.
    #[error("hash chain broken at entry {seq_id}: {details}")]
    ChainBroken {
        /// The entry where the chain broke.
        seq_id: u64,
        /// Details about the failure.
        details: String,
    },

    /// The ledger or bundle cannot be read or written.
    #[error("storage failure: {0}")]
    Storage(#[from] LedgerError),

    /// A required bundle member is missing or unreadable.
    #[error("malformed bundle: {0}")]
    BundleMalformed(String),

    /// The bundle archive cannot be read or written.
    #[error("bundle archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Canonicalization rejected the record.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    /// I/O error outside the ledger.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error on a capsule or manifest file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
