//! Append-only hash-chain ledger backed by `SQLite`.
//!
//! The ledger binds capsule hashes into a tamper-evident sequence. Each
//! entry chains to its predecessor:
//!
//! ```text
//! entry_hash = SHA-256("{prev_hash}|{capsule_hash}|{t_run}")
//! ```
//!
//! The genesis entry uses `prev_hash = "0" * 64`. Any insertion, deletion,
//! reordering, or modification of a row breaks the chain from that point
//! on. The ledger is stored as a single portable `SQLite` file, so every
//! proof bundle carries its own self-contained chain.
//!
//! # Concurrency
//!
//! A single writer at a time: the append spans tip-read and insert inside
//! one exclusive transaction, so concurrent readers either see the new
//! entry fully linked or not at all.

mod storage;

#[cfg(test)]
mod tests;

pub use storage::{
    chain_hash, AttestationLedger, ChainStatus, LedgerEntry, LedgerError, GENESIS_PREV_HASH,
};
