//! The verdict surface emitted by bundle verification.

use std::fmt;

use crate::crypto::SignatureStatus;

/// A binary check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The check passed.
    Valid,
    /// The check failed.
    Invalid,
}

impl Verdict {
    /// Maps a boolean check result onto the surface.
    #[must_use]
    pub const fn from_bool(ok: bool) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    /// The string rendered on the verdict surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
        }
    }
}

/// Outcome of the artifact comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStatus {
    /// The supplied artifact hashes to the capsule's `output_hash`.
    Match,
    /// It does not.
    Mismatch,
}

impl ObjectStatus {
    /// Maps a boolean comparison onto the surface.
    #[must_use]
    pub const fn from_bool(ok: bool) -> Self {
        if ok {
            Self::Match
        } else {
            Self::Mismatch
        }
    }

    /// The string rendered on the verdict surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Match => "MATCH",
            Self::Mismatch => "MISMATCH",
        }
    }
}

/// Whether the signing key is a configured well-known production key.
///
/// Informational only; never affects the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginStatus {
    /// The attached public key matches the configured production key.
    Known,
    /// No production key configured, no signature, or no match.
    Unknown,
}

impl OriginStatus {
    /// The string rendered on the verdict surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Known => "KNOWN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// The complete verdict surface for one verification run.
///
/// [`fmt::Display`] renders one `NAME: VALUE` line per verdict, in the
/// fixed order `LEDGER`, `CAPSULE_BINDING`, `PROOF_INPUT_HASH`,
/// `SIGNATURE`, `ORIGIN_SPE`, then `OBJECT` when an artifact was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictReport {
    /// Full-chain walk outcome; an empty ledger is invalid in a bundle.
    pub ledger: Verdict,

    /// Capsule-to-ledger binding (and manifest binding, when the capsule
    /// records a `proof_input_hash`).
    pub capsule_binding: Verdict,

    /// Recomputed manifest hash, when a manifest was readable.
    pub proof_input_hash: Option<String>,

    /// Signature check outcome.
    pub signature: SignatureStatus,

    /// Production-key origin check.
    pub origin: OriginStatus,

    /// Artifact comparison, only when an artifact was supplied.
    pub object: Option<ObjectStatus>,

    /// The capsule hash recomputed from the bundle's capsule file.
    pub capsule_hash: String,
}

impl VerdictReport {
    /// Whether every applicable verdict passed.
    ///
    /// `SIGNATURE: UNKNOWN` is tolerated (no signature was present);
    /// `SIGNATURE: INVALID` is a failure. `ORIGIN_SPE` is informational
    /// and never considered.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.ledger == Verdict::Valid
            && self.capsule_binding == Verdict::Valid
            && self.signature != SignatureStatus::Invalid
            && self.object != Some(ObjectStatus::Mismatch)
    }
}

impl fmt::Display for VerdictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LEDGER: {}", self.ledger.as_str())?;
        writeln!(f, "CAPSULE_BINDING: {}", self.capsule_binding.as_str())?;
        writeln!(
            f,
            "PROOF_INPUT_HASH: {}",
            self.proof_input_hash.as_deref().unwrap_or("UNKNOWN")
        )?;
        writeln!(f, "SIGNATURE: {}", self.signature.as_str())?;
        writeln!(f, "ORIGIN_SPE: {}", self.origin.as_str())?;
        if let Some(object) = self.object {
            writeln!(f, "OBJECT: {}", object.as_str())?;
        }
        Ok(())
    }
}
