//! `SQLite`-backed storage for the attestation ledger.

// SQLite returns i64 for row IDs and counts, but they're always non-negative
// here. Mutex poisoning indicates a panic in another thread, which is
// unrecoverable.
#![allow(clippy::cast_sign_loss, clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, TransactionBehavior};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::crypto::sha256_hex;

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// `prev_hash` of the genesis entry: 64 zero characters.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    /// Database error from `SQLite`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error during database operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the hash chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Monotonic row id, starting at 1.
    pub id: u64,

    /// Unix timestamp (seconds) recorded at append time.
    pub t_run: i64,

    /// Hash of the capsule this entry binds.
    pub capsule_hash: String,

    /// `entry_hash` of the predecessor, or [`GENESIS_PREV_HASH`].
    pub prev_hash: String,

    /// Chained hash of this entry.
    pub entry_hash: String,
}

/// Outcome of a full-chain verification walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    /// Every entry links and recomputes correctly. An empty chain is
    /// vacuously intact; bundle verification separately requires at least
    /// one entry.
    Valid,

    /// The chain breaks at `id`; entries before it still verify.
    Broken {
        /// The row id where the chain broke.
        id: u64,
        /// What disagreed.
        details: String,
    },
}

impl ChainStatus {
    /// Whether the walk completed without a break.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Computes the chained hash for a ledger entry.
#[must_use]
pub fn chain_hash(prev_hash: &str, capsule_hash: &str, t_run: i64) -> String {
    sha256_hex(format!("{prev_hash}|{capsule_hash}|{t_run}").as_bytes())
}

/// The append-only attestation ledger.
///
/// Appends are serialized through an exclusive transaction spanning
/// tip-read and insert; rows are never updated or deleted.
pub struct AttestationLedger {
    conn: Arc<Mutex<Connection>>,
    #[allow(dead_code)]
    path: Option<PathBuf>,
}

impl AttestationLedger {
    /// Opens or creates a ledger at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens an existing ledger read-only, for verification.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory ledger for testing.
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Appends a new entry binding `capsule_hash` at `t_run`.
    ///
    /// Reads the tip and inserts inside one exclusive transaction, so the
    /// chain never interleaves. Returns the new `entry_hash`.
    pub fn append(&self, capsule_hash: &str, t_run: i64) -> Result<String, LedgerError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

        let prev_hash: String = tx
            .query_row(
                "SELECT entry_hash FROM ledger ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or_else(|| GENESIS_PREV_HASH.to_string());

        let entry_hash = chain_hash(&prev_hash, capsule_hash, t_run);

        tx.execute(
            "INSERT INTO ledger (t_run, capsule_hash, prev_hash, entry_hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![t_run, capsule_hash, prev_hash, entry_hash],
        )?;
        tx.commit()?;

        Ok(entry_hash)
    }

    /// Walks the full chain in id order and checks every link.
    ///
    /// For each entry, `prev_hash` must equal the predecessor's
    /// `entry_hash` (or genesis), and `entry_hash` must recompute from
    /// `(prev, capsule_hash, t_run)`. Hash comparisons are constant-time.
    pub fn verify(&self) -> Result<ChainStatus, LedgerError> {
        let entries = self.entries()?;

        let mut expected_prev = GENESIS_PREV_HASH.to_string();
        for entry in &entries {
            if !ct_eq(&entry.prev_hash, &expected_prev) {
                return Ok(ChainStatus::Broken {
                    id: entry.id,
                    details: "prev_hash does not match predecessor".to_string(),
                });
            }
            let recomputed = chain_hash(&expected_prev, &entry.capsule_hash, entry.t_run);
            if !ct_eq(&entry.entry_hash, &recomputed) {
                return Ok(ChainStatus::Broken {
                    id: entry.id,
                    details: "entry_hash does not recompute".to_string(),
                });
            }
            expected_prev = entry.entry_hash.clone();
        }

        Ok(ChainStatus::Valid)
    }

    /// All entries, ordered by id ascending.
    pub fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, t_run, capsule_hash, prev_hash, entry_hash
             FROM ledger ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// The latest `entry_hash`, or `None` for an empty ledger.
    pub fn tip(&self) -> Result<Option<String>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT entry_hash FROM ledger ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// The most recent entry, or `None` for an empty ledger.
    pub fn last_entry(&self) -> Result<Option<LedgerEntry>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, t_run, capsule_hash, prev_hash, entry_hash
                 FROM ledger ORDER BY id DESC LIMIT 1",
                [],
                Self::row_to_entry,
            )
            .optional()?)
    }

    /// The most recent entry whose `capsule_hash` equals the given hash.
    pub fn find_binding(&self, capsule_hash: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, t_run, capsule_hash, prev_hash, entry_hash
                 FROM ledger WHERE capsule_hash = ?1 ORDER BY id DESC LIMIT 1",
                params![capsule_hash],
                Self::row_to_entry,
            )
            .optional()?)
    }

    /// Total number of entries.
    pub fn count(&self) -> Result<u64, LedgerError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ledger", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LedgerEntry> {
        Ok(LedgerEntry {
            id: row.get::<_, i64>(0)? as u64,
            t_run: row.get(1)?,
            capsule_hash: row.get(2)?,
            prev_hash: row.get(3)?,
            entry_hash: row.get(4)?,
        })
    }
}

/// Constant-time string equality; unequal lengths reject immediately.
fn ct_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}
