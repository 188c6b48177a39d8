//! Tests for the attestation ledger.

use tempfile::TempDir;

use super::*;

/// Helper to create a temporary on-disk ledger.
fn temp_ledger() -> (AttestationLedger, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("ledger.sqlite");
    let ledger = AttestationLedger::open(&path).expect("failed to open ledger");
    (ledger, dir)
}

#[test]
fn empty_ledger_is_vacuously_intact() {
    let ledger = AttestationLedger::in_memory().expect("failed to create ledger");
    assert_eq!(ledger.count().expect("failed to count"), 0);
    assert!(ledger.tip().expect("failed to read tip").is_none());
    assert!(ledger.verify().expect("failed to verify").is_valid());
}

#[test]
fn append_chains_from_genesis() {
    let ledger = AttestationLedger::in_memory().expect("failed to create ledger");

    let capsule_hash = "a".repeat(64);
    let tip = ledger.append(&capsule_hash, 111).expect("failed to append");

    let entries = ledger.entries().expect("failed to read entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 1);
    assert_eq!(entries[0].prev_hash, GENESIS_PREV_HASH);
    assert_eq!(entries[0].entry_hash, tip);
    assert_eq!(tip, chain_hash(GENESIS_PREV_HASH, &capsule_hash, 111));
}

#[test]
fn each_entry_links_to_the_previous_tip() {
    let ledger = AttestationLedger::in_memory().expect("failed to create ledger");

    let first = ledger.append(&"a".repeat(64), 111).expect("failed to append");
    let second = ledger.append(&"b".repeat(64), 222).expect("failed to append");

    let entries = ledger.entries().expect("failed to read entries");
    assert_eq!(entries[1].prev_hash, first);
    assert_eq!(entries[1].entry_hash, second);
    assert_eq!(ledger.tip().expect("failed to read tip"), Some(second));
    assert!(ledger.verify().expect("failed to verify").is_valid());
}

#[test]
fn persisted_chain_survives_reopen() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("ledger.sqlite");

    {
        let ledger = AttestationLedger::open(&path).expect("failed to open ledger");
        ledger.append(&"a".repeat(64), 1).expect("failed to append");
        ledger.append(&"b".repeat(64), 2).expect("failed to append");
    }

    let reopened = AttestationLedger::open_read_only(&path).expect("failed to reopen");
    assert_eq!(reopened.count().expect("failed to count"), 2);
    assert!(reopened.verify().expect("failed to verify").is_valid());
}

#[test]
fn rewritten_t_run_breaks_the_chain_at_that_entry() {
    let (ledger, dir) = temp_ledger();

    for (i, t_run) in [(1u8, 100i64), (2, 200), (3, 300)] {
        let capsule_hash: String = std::iter::repeat(char::from(b'a' + i - 1)).take(64).collect();
        ledger.append(&capsule_hash, t_run).expect("failed to append");
    }
    assert!(ledger.verify().expect("failed to verify").is_valid());
    drop(ledger);

    // Tamper with entry 2 out-of-band.
    let path = dir.path().join("ledger.sqlite");
    let conn = rusqlite::Connection::open(&path).expect("failed to open raw connection");
    conn.execute("UPDATE ledger SET t_run = 999 WHERE id = 2", [])
        .expect("failed to tamper");
    drop(conn);

    let tampered = AttestationLedger::open_read_only(&path).expect("failed to reopen");
    match tampered.verify().expect("failed to verify") {
        ChainStatus::Broken { id, .. } => assert_eq!(id, 2),
        ChainStatus::Valid => panic!("tampered chain verified"),
    }
}

#[test]
fn deleted_row_breaks_the_chain() {
    let (ledger, dir) = temp_ledger();
    ledger.append(&"a".repeat(64), 1).expect("failed to append");
    ledger.append(&"b".repeat(64), 2).expect("failed to append");
    ledger.append(&"c".repeat(64), 3).expect("failed to append");
    drop(ledger);

    let path = dir.path().join("ledger.sqlite");
    let conn = rusqlite::Connection::open(&path).expect("failed to open raw connection");
    conn.execute("DELETE FROM ledger WHERE id = 2", [])
        .expect("failed to tamper");
    drop(conn);

    let tampered = AttestationLedger::open_read_only(&path).expect("failed to reopen");
    assert!(!tampered.verify().expect("failed to verify").is_valid());
}

#[test]
fn binding_lookup_returns_most_recent_match() {
    let ledger = AttestationLedger::in_memory().expect("failed to create ledger");
    let repeated = "a".repeat(64);

    ledger.append(&repeated, 1).expect("failed to append");
    ledger.append(&"b".repeat(64), 2).expect("failed to append");
    ledger.append(&repeated, 3).expect("failed to append");

    let binding = ledger
        .find_binding(&repeated)
        .expect("failed to query binding")
        .expect("no binding found");
    assert_eq!(binding.id, 3);
    assert_eq!(binding.t_run, 3);

    assert!(ledger
        .find_binding(&"f".repeat(64))
        .expect("failed to query binding")
        .is_none());
}

#[test]
fn chain_hash_matches_reference_layout() {
    // SHA-256 of the literal "{prev}|{capsule}|{t_run}" payload.
    let prev = GENESIS_PREV_HASH;
    let capsule = "a".repeat(64);
    let expected = crate::crypto::sha256_hex(format!("{prev}|{capsule}|42").as_bytes());
    assert_eq!(chain_hash(prev, &capsule, 42), expected);
}
