//! # spe-core
//!
//! Core library for SPE, the Stateless Proof Engine: portable,
//! self-contained, tamper-evident cryptographic proof bundles attesting to
//! the existence and integrity of an artifact at a specific moment, under a
//! declared temporal policy, with an optional attestation of the context
//! documents available at generation time.
//!
//! Proofs verify offline: no network, server, or external state beyond the
//! bundle itself.
//!
//! ## Pipeline
//!
//! ```text
//! input ──> output hash ──> temporal gate ──> context Merkle root
//!                                                   |
//!                                                   v
//!            bundle <── ledger append <── capsule <── manifest (± signature)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use spe_core::engine::{generate_proof, ProofRequest, ProofSource};
//!
//! # fn example() -> Result<(), spe_core::SpeError> {
//! let request = ProofRequest::new(ProofSource::Text(
//!     "The answer to life is 42.".to_string(),
//! ));
//! let result = generate_proof(&request)?;
//! println!("bundle at {}", result.bundle_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! The engine certifies mathematical integrity from the instant of capsule
//! creation forward. It does not certify truth, authorship, or that any
//! model actually executed.

pub mod bundle;
pub mod canonical;
pub mod capsule;
pub mod context;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod manifest;
pub mod temporal;
pub mod tvoc;

pub use capsule::ForensicCapsule;
pub use context::ContextItem;
pub use engine::{generate_proof, verify_proof, ProofRequest, ProofResult, ProofSource};
pub use error::SpeError;
pub use ledger::AttestationLedger;
pub use manifest::ProofInputManifest;
pub use temporal::{GatePolicy, GatedContext};
